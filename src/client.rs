//! Room HTTP client.
//!
//! Wire contract with the room server:
//!
//! | Operation | Method | Path                                        |
//! |-----------|--------|---------------------------------------------|
//! | open      | POST   | `/room/open`                                |
//! | join      | POST   | `/room/{room_id}/join`                      |
//! | sync      | GET    | `/room/{room_id}`                           |
//! | create    | POST   | `/room/{room_id}/discussion/global/create`  |
//! | speak     | POST   | `/room/{room_id}/discussion/global/speak`   |
//! | reply     | POST   | `/room/{room_id}/discussion/global/reply`   |
//! | close     | DELETE | `/room/{room_id}/discussion/global/close`   |
//! | fetch     | GET    | `/room/{room_id}/tvc/fetch`                 |
//! | push      | POST   | `/room/{room_id}/tvc/push`                  |
//! | leave     | DELETE | `/room/{room_id}`                           |
//!
//! Room-scoped calls carry the session as `set-cookie: session_id=...` on the
//! request. The server reads it from there, so the header name stays as is.

use reqwest::header::{CONTENT_TYPE, HeaderValue, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RoomConfig;
use crate::error::{Result, RoomError};
use crate::schema::{Close, Create, Join, Joined, Open, Opened, Reply, RoomId, SessionId, Speak, UserId};
use crate::session::SessionConfigs;

const JSON_CONTENT_TYPE: &str = "application/json";

const CREATE_PATH: &str = "discussion/global/create";
const SPEAK_PATH: &str = "discussion/global/speak";
const REPLY_PATH: &str = "discussion/global/reply";
const CLOSE_PATH: &str = "discussion/global/close";
const FETCH_PATH: &str = "tvc/fetch";
const PUSH_PATH: &str = "tvc/push";

/// Open a new room and return the server's response text unparsed.
///
/// Without a body the request is sent with an empty payload and the server
/// applies its defaults.
///
/// # Errors
///
/// Returns [`RoomError::ApiResponse`] for non-2xx statuses and
/// [`RoomError::Http`] when the transport fails.
pub async fn open(config: &RoomConfig, body: Option<&Open>) -> Result<String> {
    let http = config.build_http()?;
    open_with(&http, &config.base_url, body).await
}

async fn open_with(http: &reqwest::Client, base_url: &str, body: Option<&Open>) -> Result<String> {
    let mut request = http
        .post(format!("{base_url}/room/open"))
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = execute(http, request).await?;
    Ok(response.text().await?)
}

/// Client bound to one room session.
///
/// Cloning is cheap and clones share the connection pool. Calls may be issued
/// concurrently; nothing orders them.
#[derive(Debug, Clone)]
pub struct RoomClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionConfigs,
    session_header: HeaderValue,
}

impl RoomClient {
    /// Client for an already established session, e.g. one loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidHeader`] if the session id cannot be sent
    /// as a header value.
    pub fn new(config: &RoomConfig, session: SessionConfigs) -> Result<Self> {
        let http = config.build_http()?;
        Self::with_http(http, config.base_url.clone(), session)
    }

    fn with_http(http: reqwest::Client, base_url: String, session: SessionConfigs) -> Result<Self> {
        let session_header = HeaderValue::from_str(&session.cookie())?;
        Ok(Self { http, base_url, session, session_header })
    }

    /// Open a room and bind a client to the session the server allocates.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body is not an `Opened` document and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn open(config: &RoomConfig, body: &Open) -> Result<Self> {
        let http = config.build_http()?;
        let text = open_with(&http, &config.base_url, Some(body)).await?;
        let opened: Opened = serde_json::from_str(&text)?;
        tracing::info!(room_id = %opened.room_id, user_id = %opened.user_id, "room opened");
        Self::with_http(http, config.base_url.clone(), opened.into())
    }

    /// Join an existing room. The returned [`Joined`] carries the room bundle
    /// and discussions as the server sent them.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body is not a `Joined` document and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn join(config: &RoomConfig, room_id: RoomId, user_id: Option<UserId>) -> Result<(Self, Joined)> {
        let http = config.build_http()?;
        let request = http
            .post(format!("{}/room/{room_id}/join", config.base_url))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(&Join { user_id });
        let joined: Joined = read_json(execute(&http, request).await?).await?;
        tracing::info!(%room_id, user_id = %joined.user_id, "room joined");

        let session = SessionConfigs::joined(room_id, &joined);
        Ok((Self::with_http(http, config.base_url.clone(), session)?, joined))
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.session.room_id
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session.session_id
    }

    #[must_use]
    pub fn session(&self) -> &SessionConfigs {
        &self.session
    }

    /// `{base}/room/{room_id}`, or `{base}/room/{room_id}/{subpath}` when a
    /// non-empty subpath is given.
    #[must_use]
    pub fn api_uri(&self, subpath: Option<&str>) -> String {
        match subpath {
            Some(subpath) if !subpath.is_empty() => {
                format!("{}/room/{}/{subpath}", self.base_url, self.session.room_id)
            }
            _ => format!("{}/room/{}", self.base_url, self.session.room_id),
        }
    }

    /// Fetch the current room state.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn sync<D: DeserializeOwned>(&self) -> Result<D> {
        let response = execute(&self.http, self.request(Method::GET, None)).await?;
        read_json(response).await
    }

    /// Create a discussion titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn create<D: DeserializeOwned>(&self, title: &str) -> Result<D> {
        let body = Create { title: title.to_owned() };
        self.send_json(Method::POST, CREATE_PATH, &body).await
    }

    /// Post `text` to a discussion.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn speak<D: DeserializeOwned>(&self, discussion_id: &str, text: &str) -> Result<D> {
        let body = Speak { discussion_id: discussion_id.into(), text: text.to_owned() };
        self.send_json(Method::POST, SPEAK_PATH, &body).await
    }

    /// Reply to message `to` in a discussion.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn reply<D: DeserializeOwned>(&self, discussion_id: &str, to: &str, text: &str) -> Result<D> {
        let body = Reply { discussion_id: discussion_id.into(), to: to.into(), text: text.to_owned() };
        self.send_json(Method::POST, REPLY_PATH, &body).await
    }

    /// Close a discussion.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn close<D: DeserializeOwned>(&self, discussion_id: &str) -> Result<D> {
        let body = Close { discussion_id: discussion_id.into() };
        self.send_json(Method::DELETE, CLOSE_PATH, &body).await
    }

    /// Download the room's version-control bundle.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses,
    /// [`RoomError::InvalidJson`] if the body does not parse as `D` and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn fetch<D: DeserializeOwned>(&self) -> Result<D> {
        let response = execute(&self.http, self.request(Method::GET, Some(FETCH_PATH))).await?;
        read_json(response).await
    }

    /// Upload a version-control bundle. The bundle is opaque to this client
    /// and the response body is discarded unread.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn push(&self, bundle: &Value) -> Result<()> {
        let request = self.request(Method::POST, Some(PUSH_PATH)).json(bundle);
        execute(&self.http, request).await?;
        tracing::info!(room_id = %self.session.room_id, "bundle pushed");
        Ok(())
    }

    /// Leave the room. The response body is discarded unread; the client
    /// itself stays usable.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ApiResponse`] for non-2xx statuses and
    /// [`RoomError::Http`] when the transport fails.
    pub async fn leave(&self) -> Result<()> {
        execute(&self.http, self.request(Method::DELETE, None)).await?;
        tracing::info!(room_id = %self.session.room_id, "room left");
        Ok(())
    }

    fn request(&self, method: Method, subpath: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, self.api_uri(subpath))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(SET_COOKIE, self.session_header.clone())
    }

    async fn send_json<S, D>(&self, method: Method, subpath: &str, body: &S) -> Result<D>
    where
        S: Serialize,
        D: DeserializeOwned,
    {
        let request = self.request(method, Some(subpath)).json(body);
        read_json(execute(&self.http, request).await?).await
    }
}

/// Send one request. Statuses outside 2xx become [`RoomError::ApiResponse`].
async fn execute(http: &reqwest::Client, builder: RequestBuilder) -> Result<Response> {
    let request = builder.build()?;
    let method = request.method().clone();
    let url = request.url().clone();
    tracing::debug!(%method, %url, "room request");

    let response = http.execute(request).await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        tracing::warn!(%method, %url, status = status.as_u16(), "room request rejected");
        return Err(RoomError::ApiResponse { status: status.as_u16(), body });
    }

    tracing::debug!(%method, %url, status = status.as_u16(), "room response");
    Ok(response)
}

async fn read_json<D: DeserializeOwned>(response: Response) -> Result<D> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
