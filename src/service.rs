use crate::model::{
    MessagePayload, MirrorPayload, MirrorView, Mutation, Snapshot, SnapshotError,
    StructurePayload, TraversalKind, TraversalPayload, TreeInfo, TreeKind,
};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("malformed tree: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("request worker is not running")]
    Disconnected,
}

/// The remote tree service, one method per logical operation.
pub trait TreeService: Send {
    fn structure(&self, kind: TreeKind) -> Result<Option<Snapshot>, ServiceError>;
    fn mirror(&self) -> Result<MirrorView, ServiceError>;
    fn info(&self, kind: TreeKind) -> Result<TreeInfo, ServiceError>;
    fn traversal(
        &self,
        kind: TreeKind,
        traversal: TraversalKind,
    ) -> Result<Vec<i64>, ServiceError>;
    /// Returns the service's message, which may describe a rejection.
    fn mutate(&self, kind: TreeKind, mutation: Mutation) -> Result<String, ServiceError>;
}

/// JSON body of a mutation request. Fields a mutation does not use are left
/// out entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_arbol: Option<TreeKind>,
}

/// Path and body for a mutation.
pub fn mutation_request(kind: TreeKind, mutation: Mutation) -> (&'static str, MutationBody) {
    let body = MutationBody {
        valor: None,
        m: None,
        tipo_arbol: Some(kind),
    };
    match mutation {
        Mutation::Insert(value) => (
            "/insertar",
            MutationBody {
                valor: Some(value),
                ..body
            },
        ),
        Mutation::Delete(value) => (
            "/eliminar",
            MutationBody {
                valor: Some(value),
                ..body
            },
        ),
        Mutation::Clear => ("/limpiar", body),
        // The degree applies to the m-ary tree only; no tree type is sent.
        Mutation::Configure(m) => (
            "/configurar_mvias",
            MutationBody {
                valor: None,
                m: Some(m),
                tipo_arbol: None,
            },
        ),
    }
}

pub struct HttpTreeService {
    client: Client,
    base_url: String,
}

impl HttpTreeService {
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, kind: Option<TreeKind>) -> String {
        match kind {
            Some(kind) => format!("{}{}?tipo_arbol={}", self.base_url, path, kind.as_str()),
            None => format!("{}{}", self.base_url, path),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send()?;
        decode(response)
    }

    fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send()?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response.json()?)
}

impl TreeService for HttpTreeService {
    fn structure(&self, kind: TreeKind) -> Result<Option<Snapshot>, ServiceError> {
        let payload: StructurePayload = self.get_json(&self.url("/estructura", Some(kind)))?;
        Ok(payload.arbol.map(Snapshot::try_from).transpose()?)
    }

    fn mirror(&self) -> Result<MirrorView, ServiceError> {
        let payload: MirrorPayload = self.get_json(&self.url("/espejo", None))?;
        Ok(MirrorView {
            snapshot: payload.arbol.map(Snapshot::try_from).transpose()?,
            message: payload.mensaje,
        })
    }

    fn info(&self, kind: TreeKind) -> Result<TreeInfo, ServiceError> {
        self.get_json(&self.url("/info_arbol", Some(kind)))
    }

    fn traversal(
        &self,
        kind: TreeKind,
        traversal: TraversalKind,
    ) -> Result<Vec<i64>, ServiceError> {
        let path = format!("/recorrido/{}", traversal.as_str());
        let payload: TraversalPayload = self.get_json(&self.url(&path, Some(kind)))?;
        Ok(payload.recorrido)
    }

    fn mutate(&self, kind: TreeKind, mutation: Mutation) -> Result<String, ServiceError> {
        let (path, body) = mutation_request(kind, mutation);
        let payload: MessagePayload = self.post_json(&self.url(path, None), &body)?;
        Ok(payload.mensaje)
    }
}
