//! Mock server helpers for exercising the network paths in tests.

use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A wiremock server usable from blocking test code.
///
/// The update client is synchronous, so the server runs on its own tokio
/// runtime; the runtime's worker threads keep serving while the test thread
/// drives the blocking client.
pub(crate) struct MockHost {
    runtime: Runtime,
    server: MockServer,
}

impl MockHost {
    pub(crate) fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime for mock server");
        let server = runtime.block_on(MockServer::start());
        MockHost { runtime, server }
    }

    /// Absolute URL for a route on this server.
    pub(crate) fn url(&self, route: &str) -> String {
        format!("{}{}", self.server.uri(), route)
    }

    /// Mount a GET route returning the given status and body. Requests to
    /// unmounted routes get wiremock's default 404.
    pub(crate) fn mock_get(&self, route: &str, status: u16, body: Vec<u8>) {
        self.runtime.block_on(
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
                .mount(&self.server),
        );
    }
}
