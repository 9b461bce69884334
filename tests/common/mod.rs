//! Shared test harness

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_platform;
pub mod mock_transport;

use fixtures::OWNER;
use mock_platform::MockRecordService;
use mock_transport::{MockContentSource, MockNotifier};
use moments_relay::config::Settings;
use moments_relay::relay::{InboundEvent, Relay};
use std::sync::Arc;

/// A relay wired to mocks, plus handles to inspect them
pub struct Harness {
    pub relay: Arc<Relay>,
    pub records: Arc<MockRecordService>,
    pub notifier: Arc<MockNotifier>,
    pub content: Arc<MockContentSource>,
}

impl Harness {
    /// Relay with default settings for [`OWNER`]
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    /// Relay with adjusted settings
    pub fn with_settings(adjust: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = Settings::new(OWNER);
        adjust(&mut settings);

        let records = Arc::new(MockRecordService::new());
        let notifier = Arc::new(MockNotifier::new());
        let content = Arc::new(MockContentSource::new());
        let relay = Relay::new(
            settings,
            Arc::clone(&records) as _,
            Arc::clone(&content) as _,
            Arc::clone(&notifier) as _,
        );

        Self {
            relay,
            records,
            notifier,
            content,
        }
    }

    /// Feed one event and fail the test if reaching the user failed
    pub async fn send(&self, event: InboundEvent) {
        self.relay.handle_event(event).await.unwrap();
    }
}
