//! Plain HTTP plumbing with no knowledge of any particular platform.

use failure::Error;
use reqwest::blocking::{Client, RequestBuilder};
use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use crate::errors::TransportError;

/// How long to wait for a request when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something which can send a request and hand back the full response body.
///
/// The status code is not inspected. Whatever the server sends back is
/// returned to the caller.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, Error>;
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, Error>;
}

/// A [`Transport`] backed by a blocking `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<HttpTransport, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport::with_client(client))
    }

    pub fn with_client(client: Client) -> HttpTransport {
        HttpTransport { client }
    }

    fn send(&self, url: &str, request: RequestBuilder) -> Result<Vec<u8>, Error> {
        // The response owns the connection, which goes back to the pool (or is
        // closed) when it's dropped, no matter which way we leave this scope.
        let response = request.send().map_err(|inner| TransportError {
            url: url.to_string(),
            inner,
        })?;

        let status = response.status();
        debug!("Received response ({}) from {}", status, url);

        if !status.is_success() {
            warn!("Request to {} failed with {}", url, status);
        }

        let body = response.bytes().map_err(|inner| TransportError {
            url: url.to_string(),
            inner,
        })?;

        trace!("Body: {}", String::from_utf8_lossy(&body));

        Ok(body.to_vec())
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, Error> {
        debug!("Sending GET to {}", url);
        self.send(url, self.client.get(url))
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, Error> {
        debug!("Sending POST to {}", url);
        self.send(url, self.client.post(url).form(form))
    }
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("HttpTransport").finish()
    }
}

#[cfg(test)]
pub(crate) use self::mock::{ConnectionRefused, MockTransport, Recorded};

#[cfg(test)]
mod mock {
    use super::Transport;
    use failure::Error;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// A request the [`MockTransport`] was asked to send.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Recorded {
        pub method: &'static str,
        pub url: String,
        pub form: Vec<(String, String)>,
    }

    #[derive(Debug, Fail)]
    #[fail(display = "Connection refused ({})", url)]
    pub(crate) struct ConnectionRefused {
        pub url: String,
    }

    /// An in-memory transport. Unknown URLs behave like a refused connection.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockTransport {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        routes: HashMap<(&'static str, String), VecDeque<Vec<u8>>>,
        requests: Vec<Recorded>,
    }

    impl MockTransport {
        pub fn new() -> MockTransport {
            MockTransport::default()
        }

        pub fn on_get<U, B>(&self, url: U, body: B) -> &MockTransport
        where
            U: Into<String>,
            B: Into<Vec<u8>>,
        {
            self.push("GET", url.into(), body.into());
            self
        }

        pub fn on_post<U, B>(&self, url: U, body: B) -> &MockTransport
        where
            U: Into<String>,
            B: Into<Vec<u8>>,
        {
            self.push("POST", url.into(), body.into());
            self
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.inner.lock().unwrap().requests.clone()
        }

        fn push(&self, method: &'static str, url: String, body: Vec<u8>) {
            self.inner
                .lock()
                .unwrap()
                .routes
                .entry((method, url))
                .or_default()
                .push_back(body);
        }

        fn respond(
            &self,
            method: &'static str,
            url: &str,
            form: &[(&str, &str)],
        ) -> Result<Vec<u8>, Error> {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(Recorded {
                method,
                url: url.to_string(),
                form: form
                    .iter()
                    .map(|&(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });

            inner
                .routes
                .get_mut(&(method, url.to_string()))
                .and_then(|queue| queue.pop_front())
                .ok_or_else(|| {
                    ConnectionRefused {
                        url: url.to_string(),
                    }
                    .into()
                })
        }
    }

    impl Transport for MockTransport {
        fn get(&self, url: &str) -> Result<Vec<u8>, Error> {
            self.respond("GET", url, &[])
        }

        fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, Error> {
            self.respond("POST", url, form)
        }
    }
}
