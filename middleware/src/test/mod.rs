mod registration_middleware_test;
