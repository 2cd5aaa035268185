//! Attached page target.
//!
//! A [`Page`] is one `about:blank` target created in the browser and attached
//! in flat session mode. Its events arrive on a dedicated channel and are
//! narrowed to the [`PageEvent`]s a capture cares about.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{
    Command, EmulationCommand, Event, NetworkCommand, PageCommand, ParsedEvent, RequestWillBeSent,
    ResponseReceived, TargetCommand,
};
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Lifecycle milestone reported when at most two requests stayed in flight
/// for 500 ms.
pub const NETWORK_ALMOST_IDLE: &str = "networkAlmostIdle";

// ============================================================================
// PageEvent
// ============================================================================

/// Events of an attached page, in arrival order.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A request is about to be sent.
    RequestWillBeSent(RequestWillBeSent),
    /// Response headers arrived.
    ResponseReceived(ResponseReceived),
    /// The current navigation reached network quiescence.
    NetworkIdle,
    /// The renderer crashed or the page session was detached.
    Crashed,
}

// ============================================================================
// Page
// ============================================================================

/// A page target attached over the browser connection.
pub struct Page {
    /// Target id.
    target_id: TargetId,
    /// Flat session id.
    session_id: SessionId,
    /// Browser connection.
    connection: Connection,
    /// Events of this session.
    events: mpsc::UnboundedReceiver<Event>,
    /// Loader of the last navigation; lifecycle events of other loaders are ignored.
    loader_id: Option<String>,
}

impl Page {
    /// Creates a blank page, attaches to it and enables the domains the
    /// capture relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the browser rejects any of the commands.
    pub async fn open(connection: Connection, viewport: (u32, u32)) -> Result<Self> {
        let created = connection
            .execute(
                None,
                Command::Target(TargetCommand::CreateTarget {
                    url: "about:blank".into(),
                }),
            )
            .await?;
        let target_id = TargetId::new(required_string(&created, "targetId")?);

        let attached = connection
            .execute(
                None,
                Command::Target(TargetCommand::AttachToTarget {
                    target_id: target_id.clone(),
                    flatten: true,
                }),
            )
            .await?;
        let session_id = SessionId::new(required_string(&attached, "sessionId")?);
        let events = connection.subscribe(Some(session_id.clone()));

        debug!(target = %target_id, session = %session_id, "Attached to page");

        let page = Self {
            target_id,
            session_id,
            connection,
            events,
            loader_id: None,
        };

        let (width, height) = viewport;
        for command in [
            Command::Network(NetworkCommand::Enable),
            Command::Page(PageCommand::Enable),
            Command::Page(PageCommand::SetLifecycleEventsEnabled { enabled: true }),
            Command::Emulation(EmulationCommand::SetDeviceMetricsOverride {
                width,
                height,
                device_scale_factor: 1.0,
                mobile: false,
            }),
        ] {
            page.execute(command).await?;
        }

        Ok(page)
    }

    /// Returns the target id.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Navigates to `url` and remembers the navigation's loader.
    ///
    /// Returns once the browser committed (or refused) the navigation; the
    /// load itself continues in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Navigation`] with the browser's error text (for
    /// example `net::ERR_NAME_NOT_RESOLVED`) if the navigation failed.
    pub async fn navigate(&mut self, url: &Url) -> Result<()> {
        let result = self
            .execute(Command::Page(PageCommand::Navigate {
                url: url.to_string(),
            }))
            .await?;

        if let Some(error_text) = result.get("errorText").and_then(Value::as_str)
            && !error_text.is_empty()
        {
            return Err(Error::navigation(url.as_str(), error_text));
        }

        self.loader_id = result
            .get("loaderId")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        debug!(url = %url, loader = ?self.loader_id, "Navigation committed");
        Ok(())
    }

    /// Waits for the next relevant event.
    ///
    /// Returns `None` when the connection is gone.
    pub async fn next_event(&mut self) -> Option<PageEvent> {
        loop {
            let event = self.events.recv().await?;

            match event.parse() {
                ParsedEvent::NetworkRequestWillBeSent(sent) => {
                    return Some(PageEvent::RequestWillBeSent(sent));
                }
                ParsedEvent::NetworkResponseReceived(received) => {
                    return Some(PageEvent::ResponseReceived(received));
                }
                ParsedEvent::PageLifecycle(lifecycle)
                    if lifecycle.name == NETWORK_ALMOST_IDLE
                        && self.is_current_loader(&lifecycle.loader_id) =>
                {
                    return Some(PageEvent::NetworkIdle);
                }
                ParsedEvent::InspectorTargetCrashed => return Some(PageEvent::Crashed),
                ParsedEvent::TargetDetached { session_id }
                    if session_id == self.session_id.as_str() =>
                {
                    debug!(session = %self.session_id, "Page session detached");
                    return Some(PageEvent::Crashed);
                }
                other => trace!(event = ?other, "Ignoring page event"),
            }
        }
    }

    /// Stops routing events to this page.
    pub fn detach(&self) {
        self.connection.unsubscribe(&Some(self.session_id.clone()));
    }

    /// Executes a command in this page's session.
    async fn execute(&self, command: Command) -> Result<Value> {
        self.connection
            .execute(Some(&self.session_id), command)
            .await
    }

    /// Returns `true` if `loader_id` belongs to the last navigation.
    fn is_current_loader(&self, loader_id: &str) -> bool {
        match self.loader_id.as_deref() {
            Some(current) => current == loader_id,
            None => false,
        }
    }
}

/// Reads a required string field of a command result.
fn required_string(result: &Value, key: &str) -> Result<String> {
    result
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::protocol(format!("Missing {key} in command result")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::Message;

    /// Fake browser that answers every command from a table and can push events.
    struct FakeBrowser {
        socket: WebSocketStream<TcpStream>,
    }

    impl FakeBrowser {
        async fn start() -> (Connection, Self) {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("addr");
            let accept = tokio::spawn(async move {
                let (stream, _) = listener.accept().await.expect("accept");
                tokio_tungstenite::accept_async(stream).await.expect("upgrade")
            });
            let connection = Connection::connect(&format!("ws://{addr}"))
                .await
                .expect("connect");
            let socket = accept.await.expect("join");
            (connection, Self { socket })
        }

        /// Answers the next command with `result` and returns the command.
        async fn answer(&mut self, result: Value) -> Value {
            let request = loop {
                if let Message::Text(text) = self.socket.next().await.expect("msg").expect("frame") {
                    break serde_json::from_str::<Value>(&text).expect("json");
                }
            };
            let reply = json!({ "id": request["id"], "result": result });
            self.push(reply).await;
            request
        }

        async fn push(&mut self, message: Value) {
            self.socket
                .send(Message::Text(message.to_string().into()))
                .await
                .expect("send");
        }
    }

    async fn open_page() -> (Page, FakeBrowser) {
        let (connection, mut browser) = FakeBrowser::start().await;
        let open = tokio::spawn(Page::open(connection, (1280, 720)));

        let create = browser.answer(json!({ "targetId": "T1" })).await;
        assert_eq!(create["method"], "Target.createTarget");
        assert_eq!(create["params"]["url"], "about:blank");

        let attach = browser.answer(json!({ "sessionId": "S1" })).await;
        assert_eq!(attach["params"]["flatten"], true);

        let mut methods = Vec::new();
        for _ in 0..4 {
            let command = browser.answer(json!({})).await;
            assert_eq!(command["sessionId"], "S1");
            methods.push(command["method"].as_str().unwrap_or_default().to_string());
        }
        assert_eq!(
            methods,
            [
                "Network.enable",
                "Page.enable",
                "Page.setLifecycleEventsEnabled",
                "Emulation.setDeviceMetricsOverride"
            ]
        );

        let page = open.await.expect("join").expect("open");
        (page, browser)
    }

    #[tokio::test]
    async fn test_open_attaches_and_enables_domains() {
        let (page, _browser) = open_page().await;
        assert_eq!(page.target_id().as_str(), "T1");
        assert_eq!(page.session_id().as_str(), "S1");
    }

    #[tokio::test]
    async fn test_navigate_error_text_is_navigation_error() {
        let (mut page, mut browser) = open_page().await;
        let url = Url::parse("https://nope.invalid/").expect("url");

        let navigate = tokio::spawn(async move { page.navigate(&url).await });
        browser
            .answer(json!({ "frameId": "F1", "errorText": "net::ERR_NAME_NOT_RESOLVED" }))
            .await;

        let err = navigate.await.expect("join").expect_err("should fail");
        assert!(matches!(err, Error::Navigation { .. }));
        assert!(err.to_string().contains("net::ERR_NAME_NOT_RESOLVED"));
    }

    #[tokio::test]
    async fn test_idle_only_for_current_loader() {
        let (mut page, mut browser) = open_page().await;
        let url = Url::parse("https://example.com/").expect("url");

        let navigate = tokio::spawn(async move {
            page.navigate(&url).await.expect("navigate");
            page
        });
        browser
            .answer(json!({ "frameId": "F1", "loaderId": "L2" }))
            .await;
        let mut page = navigate.await.expect("join");

        for loader in ["L1", "L2"] {
            browser
                .push(json!({
                    "method": "Page.lifecycleEvent",
                    "sessionId": "S1",
                    "params": { "frameId": "F1", "loaderId": loader, "name": NETWORK_ALMOST_IDLE }
                }))
                .await;
        }
        browser
            .push(json!({ "method": "Inspector.targetCrashed", "sessionId": "S1", "params": {} }))
            .await;

        assert!(matches!(page.next_event().await, Some(PageEvent::NetworkIdle)));
        assert!(matches!(page.next_event().await, Some(PageEvent::Crashed)));
    }

    #[tokio::test]
    async fn test_detached_session_ends_page() {
        let (mut page, mut browser) = open_page().await;

        // A child session of this page detaching is not the page going away.
        browser
            .push(json!({
                "method": "Target.detachedFromTarget",
                "sessionId": "S1",
                "params": { "sessionId": "S9", "targetId": "T9" }
            }))
            .await;
        browser
            .push(json!({
                "method": "Target.detachedFromTarget",
                "params": { "sessionId": "S1", "targetId": "T1" }
            }))
            .await;

        assert!(matches!(page.next_event().await, Some(PageEvent::Crashed)));
    }

    #[tokio::test]
    async fn test_closed_connection_ends_events() {
        let (mut page, browser) = open_page().await;
        drop(browser);
        assert!(page.next_event().await.is_none());
    }
}
