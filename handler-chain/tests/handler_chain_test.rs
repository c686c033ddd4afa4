//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: middleware before/after ordering, middleware stopping the chain, a handler's
//! Reply stopping the chain and being passed to middleware after, and Ignore falling
//! through to the next handler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use gbot_core::{
    Chat, Handler, HandlerResponse, Message, MessageDirection, Middleware, User,
};
use handler_chain::HandlerChain;

fn create_test_message(content: &str) -> Message {
    Message {
        id: 1,
        content: content.to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        message_type: "text".to_string(),
        photo_file_id: None,
        direction: MessageDirection::Incoming,
        created_at: Local::now(),
        reply_to_message_id: None,
    }
}

struct CountingMiddleware {
    before_count: Arc<AtomicUsize>,
    after_count: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Middleware for CountingMiddleware {
    async fn before(&self, _message: &Message) -> gbot_core::Result<bool> {
        self.before_count.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> gbot_core::Result<()> {
        self.after_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountingHandler {
    handle_count: Arc<AtomicUsize>,
    response: HandlerResponse,
}

#[async_trait::async_trait]
impl Handler for CountingHandler {
    async fn handle(&self, _message: &Message) -> gbot_core::Result<HandlerResponse> {
        self.handle_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// **Test: middleware before and after run around one handler invocation.**
///
/// **Setup:** One counting middleware, one counting handler returning Continue.
/// **Action:** `chain.handle(&message)`.
/// **Expected:** before=1, handle=1, after=1; final response is Continue.
#[tokio::test]
async fn test_chain_runs_middleware_and_handler() {
    let before_count = Arc::new(AtomicUsize::new(0));
    let after_count = Arc::new(AtomicUsize::new(0));
    let handle_count = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(CountingMiddleware {
            before_count: before_count.clone(),
            after_count: after_count.clone(),
        }))
        .add_handler(Arc::new(CountingHandler {
            handle_count: handle_count.clone(),
            response: HandlerResponse::Continue,
        }));

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(before_count.load(Ordering::SeqCst), 1);
    assert_eq!(handle_count.load(Ordering::SeqCst), 1);
    assert_eq!(after_count.load(Ordering::SeqCst), 1);
}

/// **Test: middleware before returning false stops the chain; no handler runs.**
#[tokio::test]
async fn test_middleware_stops_chain() {
    struct BlockingMiddleware;

    #[async_trait::async_trait]
    impl Middleware for BlockingMiddleware {
        async fn before(&self, _message: &Message) -> gbot_core::Result<bool> {
            Ok(false)
        }
    }

    let handle_count = Arc::new(AtomicUsize::new(0));
    let chain = HandlerChain::new()
        .add_middleware(Arc::new(BlockingMiddleware))
        .add_handler(Arc::new(CountingHandler {
            handle_count: handle_count.clone(),
            response: HandlerResponse::Continue,
        }));

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(handle_count.load(Ordering::SeqCst), 0);
}

/// **Test: Reply stops the handler phase and reaches middleware after.**
///
/// **Setup:** Middleware capturing the response; handler returning Reply, then a
/// second handler that must not run.
/// **Expected:** result is Reply("javob"); second handler never invoked; middleware
/// after saw the reply text.
#[tokio::test]
async fn test_reply_stops_chain_and_reaches_after() {
    struct CaptureMiddleware {
        seen: Arc<Mutex<Option<HandlerResponse>>>,
    }

    #[async_trait::async_trait]
    impl Middleware for CaptureMiddleware {
        async fn after(
            &self,
            _message: &Message,
            response: &HandlerResponse,
        ) -> gbot_core::Result<()> {
            *self.seen.lock().unwrap() = Some(response.clone());
            Ok(())
        }
    }

    let seen = Arc::new(Mutex::new(None));
    let late_count = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(CaptureMiddleware { seen: seen.clone() }))
        .add_handler(Arc::new(CountingHandler {
            handle_count: Arc::new(AtomicUsize::new(0)),
            response: HandlerResponse::Reply("javob".to_string()),
        }))
        .add_handler(Arc::new(CountingHandler {
            handle_count: late_count.clone(),
            response: HandlerResponse::Continue,
        }));

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Reply("javob".to_string()));
    assert_eq!(late_count.load(Ordering::SeqCst), 0);
    assert_eq!(
        *seen.lock().unwrap(),
        Some(HandlerResponse::Reply("javob".to_string()))
    );
}

/// **Test: Ignore falls through to the next handler.**
#[tokio::test]
async fn test_ignore_falls_through() {
    let first_count = Arc::new(AtomicUsize::new(0));
    let second_count = Arc::new(AtomicUsize::new(0));

    let chain = HandlerChain::new()
        .add_handler(Arc::new(CountingHandler {
            handle_count: first_count.clone(),
            response: HandlerResponse::Ignore,
        }))
        .add_handler(Arc::new(CountingHandler {
            handle_count: second_count.clone(),
            response: HandlerResponse::Stop,
        }));

    let message = create_test_message("test");
    let result = chain.handle(&message).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(first_count.load(Ordering::SeqCst), 1);
    assert_eq!(second_count.load(Ordering::SeqCst), 1);
}

/// **Test: two middleware — before in order, after in reverse.**
#[tokio::test]
async fn test_middleware_order() {
    let order = Arc::new(Mutex::new(Vec::new()));

    struct OrderMiddleware {
        name: &'static str,
        order: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Middleware for OrderMiddleware {
        async fn before(&self, _message: &Message) -> gbot_core::Result<bool> {
            self.order.lock().unwrap().push(format!("before_{}", self.name));
            Ok(true)
        }

        async fn after(
            &self,
            _message: &Message,
            _response: &HandlerResponse,
        ) -> gbot_core::Result<()> {
            self.order.lock().unwrap().push(format!("after_{}", self.name));
            Ok(())
        }
    }

    let chain = HandlerChain::new()
        .add_middleware(Arc::new(OrderMiddleware {
            name: "first",
            order: order.clone(),
        }))
        .add_middleware(Arc::new(OrderMiddleware {
            name: "second",
            order: order.clone(),
        }));

    let message = create_test_message("test");
    chain.handle(&message).await.unwrap();

    let executed = order.lock().unwrap();
    assert_eq!(
        *executed,
        vec!["before_first", "before_second", "after_second", "after_first"]
    );
}
