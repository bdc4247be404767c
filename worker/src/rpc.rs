use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use common::{
    AskForWorkRequest, AskForWorkResponse, MarkWorkAsFinishedRequest,
    MarkWorkAsFinishedResponse, TaskKind, Work,
};

#[derive(Debug, Error)]
pub enum RpcError {
    /// No se pudo conectar (refused/reset): el coordinator puede haberse ido.
    #[error("coordinator inalcanzable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("el coordinator respondió {0}")]
    Status(StatusCode),

    #[error("error de transporte: {0}")]
    Transport(#[source] reqwest::Error),
}

impl RpcError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RpcError::Unreachable(_))
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        // conexión rechazada, o cortada a mitad de un pedido
        if e.is_connect() || (e.is_request() && !e.is_timeout()) {
            RpcError::Unreachable(e)
        } else if let Some(status) = e.status() {
            RpcError::Status(status)
        } else {
            RpcError::Transport(e)
        }
    }
}

/// Cliente HTTP de las dos RPC del coordinator.
#[derive(Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RpcError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }
        Ok(resp.json::<R>().await?)
    }

    pub async fn ask_for_work(&self, worker_id: &str) -> Result<Work, RpcError> {
        let resp: AskForWorkResponse = self
            .post(
                "/api/v1/tasks/next",
                &AskForWorkRequest {
                    worker_id: worker_id.to_string(),
                },
            )
            .await?;
        Ok(resp.into_work())
    }

    pub async fn mark_work_as_finished(
        &self,
        worker_id: &str,
        task_name: &str,
        task_kind: TaskKind,
    ) -> Result<bool, RpcError> {
        let resp: MarkWorkAsFinishedResponse = self
            .post(
                "/api/v1/tasks/complete",
                &MarkWorkAsFinishedRequest {
                    worker_id: worker_id.to_string(),
                    task_name: task_name.to_string(),
                    task_kind,
                },
            )
            .await?;
        Ok(resp.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_sin_barra_final() {
        let c = CoordinatorClient::new("http://localhost:8080/");
        assert_eq!(c.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn puerto_cerrado_es_inalcanzable() {
        // reservamos un puerto y lo soltamos para que nadie escuche ahí
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let c = CoordinatorClient::new(format!("http://127.0.0.1:{}", port));

        let err = c.ask_for_work("w1").await.unwrap_err();
        assert!(err.is_unreachable(), "esperaba Unreachable, llegó {:?}", err);
    }
}
