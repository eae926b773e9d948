//! CDP session attached to a single tab.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use reviewfilter_protocols::NodeId;

use super::client::Connection;
use super::error::CdpError;
use super::protocol::RemoteObject;

pub struct PageSession {
    target_id: String,
    session_id: String,
    connection: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, connection: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            connection,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a command within this session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.connection
            .call(method, params, Some(&self.session_id))
            .await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Full document tree as raw JSON. Node ids stay valid until the next
    /// document request or navigation.
    pub async fn get_document(&self) -> Result<Value, CdpError> {
        let mut result = self
            .call("DOM.getDocument", Some(json!({"depth": -1})))
            .await?;
        match result.get_mut("root").map(Value::take) {
            Some(root) if root.is_object() => Ok(root),
            _ => Err(CdpError::InvalidResponse("Missing document root".to_string())),
        }
    }

    pub async fn set_attribute(&self, node_id: NodeId, name: &str, value: &str) -> Result<(), CdpError> {
        self.call(
            "DOM.setAttributeValue",
            Some(json!({"nodeId": node_id, "name": name, "value": value})),
        )
        .await?;
        Ok(())
    }

    pub async fn remove_attribute(&self, node_id: NodeId, name: &str) -> Result<(), CdpError> {
        self.call(
            "DOM.removeAttribute",
            Some(json!({"nodeId": node_id, "name": name})),
        )
        .await?;
        Ok(())
    }

    /// Resolve a DOM node to a Runtime object id.
    pub async fn resolve_node(&self, node_id: NodeId) -> Result<String, CdpError> {
        let result = self
            .call("DOM.resolveNode", Some(json!({"nodeId": node_id})))
            .await?;
        let object: RemoteObject = serde_json::from_value(result["object"].clone())?;
        object
            .object_id
            .ok_or_else(|| CdpError::InvalidResponse(format!("Node {} has no object id", node_id)))
    }

    /// Call a function with `this` bound to a remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, CdpError> {
        let params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "arguments": args.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>(),
            "returnByValue": true,
        });

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObject",
            Some(json!({"objectId": object_id})),
        )
        .await?;
        Ok(())
    }
}
