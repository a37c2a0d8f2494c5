pub mod client;
pub mod types;

#[derive(Debug, Clone, Default)]
pub struct NodeService;

impl NodeService {
    pub fn name(&self) -> &'static str {
        "node"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}
