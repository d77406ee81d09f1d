//! Material schemas and flat material network conversion.
//!
//! The `material` container maps a render context to a network. A
//! network holds `nodes` keyed by node path and `terminals` keyed by
//! terminal name:
//!
//! ```text
//! material
//! └── <render context>
//!     ├── nodes
//!     │   └── <node path>
//!     │       ├── nodeIdentifier
//!     │       ├── parameters / <name> / value
//!     │       └── inputConnections / <input> / [connection, ...]
//!     └── terminals / <terminal> / connection
//! ```
//!
//! A connection names `upstreamNodePath` and `upstreamNodeOutputName`.

use std::collections::BTreeMap;

use super::{container_child, sampled_child, typed_child, Schema};
use crate::core::{
    retained_value, ContainerHandle, DataSource, RetainedContainerDataSource,
    RetainedSmallVectorDataSource, SampledHandle,
};
use crate::util::{ScenePath, Token, Value};

pub const MATERIAL: &str = "material";
pub const NODES: &str = "nodes";
pub const TERMINALS: &str = "terminals";
pub const NODE_IDENTIFIER: &str = "nodeIdentifier";
pub const PARAMETERS: &str = "parameters";
pub const INPUT_CONNECTIONS: &str = "inputConnections";
pub const PARAMETER_VALUE: &str = "value";
pub const UPSTREAM_NODE_PATH: &str = "upstreamNodePath";
pub const UPSTREAM_NODE_OUTPUT_NAME: &str = "upstreamNodeOutputName";

/// Render context used by every renderer without a specific network.
pub const UNIVERSAL_RENDER_CONTEXT: &str = "";

// ============================================================================
// Flat networks
// ============================================================================

/// One shading node of a flat network.
#[derive(Clone, Debug, Default)]
pub struct MaterialNode {
    pub path: ScenePath,
    pub identifier: Token,
    pub parameters: BTreeMap<Token, Value>,
}

impl MaterialNode {
    pub fn new(path: ScenePath, identifier: impl Into<Token>) -> Self {
        Self {
            path,
            identifier: identifier.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<Token>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// Output `input_name` of node `input_id` feeds input `output_name` of
/// node `output_id`.
#[derive(Clone, Debug)]
pub struct MaterialRelationship {
    pub input_id: ScenePath,
    pub input_name: Token,
    pub output_id: ScenePath,
    pub output_name: Token,
}

/// Nodes plus the connections between them.
///
/// The last node is the one driving the network's terminal.
#[derive(Clone, Debug, Default)]
pub struct MaterialNetwork {
    pub nodes: Vec<MaterialNode>,
    pub relationships: Vec<MaterialRelationship>,
}

impl MaterialNetwork {
    /// Connect `input_id.input_name` into `output_id.output_name`.
    pub fn connect(
        &mut self,
        input_id: &ScenePath,
        input_name: impl Into<Token>,
        output_id: &ScenePath,
        output_name: impl Into<Token>,
    ) {
        self.relationships.push(MaterialRelationship {
            input_id: input_id.clone(),
            input_name: input_name.into(),
            output_id: output_id.clone(),
            output_name: output_name.into(),
        });
    }
}

/// Networks keyed by terminal name (`surface`, `displacement`, ...).
#[derive(Clone, Debug, Default)]
pub struct MaterialNetworkMap {
    pub map: BTreeMap<Token, MaterialNetwork>,
}

/// Convert a flat network map into a `material` schema container.
///
/// All networks land in the universal render context. Empty networks are
/// skipped. A node appearing in several networks keeps the last one seen.
pub fn convert_material_network_to_material_schema(network_map: &MaterialNetworkMap) -> ContainerHandle {
    let mut nodes: Vec<(Token, DataSource)> = Vec::new();
    let mut terminals: Vec<(Token, DataSource)> = Vec::new();

    for (terminal_name, network) in &network_map.map {
        let Some(terminal_node) = network.nodes.last() else {
            tracing::debug!(terminal = %terminal_name, "skipping empty material network");
            continue;
        };

        for node in &network.nodes {
            let parameters = RetainedContainerDataSource::new(node.parameters.iter().map(
                |(name, value)| {
                    (
                        name.clone(),
                        DataSource::Container(MaterialNodeParameterSchema::build_retained(
                            value.clone(),
                        )),
                    )
                },
            ));

            // Connections into this node, grouped by input name.
            let mut connections: BTreeMap<Token, Vec<DataSource>> = BTreeMap::new();
            for rel in network.relationships.iter().filter(|r| r.output_id == node.path) {
                connections
                    .entry(rel.output_name.clone())
                    .or_default()
                    .push(DataSource::Container(MaterialConnectionSchema::build_retained(
                        Token::new(&rel.input_id.to_string()),
                        rel.input_name.clone(),
                    )));
            }
            let input_connections = RetainedContainerDataSource::new(
                connections
                    .into_iter()
                    .map(|(name, v)| (name, DataSource::Vector(RetainedSmallVectorDataSource::new(v)))),
            );

            nodes.push((
                Token::new(&node.path.to_string()),
                DataSource::Container(MaterialNodeSchema::build_retained(
                    node.identifier.clone(),
                    parameters,
                    input_connections,
                )),
            ));
        }

        terminals.push((
            terminal_name.clone(),
            DataSource::Container(MaterialConnectionSchema::build_retained(
                Token::new(&terminal_node.path.to_string()),
                terminal_name.clone(),
            )),
        ));
    }

    let network = MaterialNetworkSchema::build_retained(
        RetainedContainerDataSource::new(nodes),
        RetainedContainerDataSource::new(terminals),
    );
    MaterialSchema::build_retained([(UNIVERSAL_RENDER_CONTEXT, network)])
}

// ============================================================================
// Schemas
// ============================================================================

/// View over a prim's `material` container.
#[derive(Clone)]
pub struct MaterialSchema {
    container: ContainerHandle,
}

impl MaterialSchema {
    pub fn render_contexts(&self) -> Vec<Token> {
        self.container.names()
    }

    /// Network for `context`, falling back to the universal context.
    pub fn network(&self, context: &str) -> Option<MaterialNetworkSchema> {
        container_child(&self.container, context)
            .or_else(|| container_child(&self.container, UNIVERSAL_RENDER_CONTEXT))
            .map(|container| MaterialNetworkSchema { container })
    }

    pub fn build_retained<I, N>(networks: I) -> ContainerHandle
    where
        I: IntoIterator<Item = (N, ContainerHandle)>,
        N: Into<Token>,
    {
        RetainedContainerDataSource::new(
            networks
                .into_iter()
                .map(|(context, c)| (context.into(), DataSource::Container(c))),
        )
    }
}

impl Schema for MaterialSchema {
    const SCHEMA_TOKEN: &'static str = MATERIAL;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

#[derive(Clone)]
pub struct MaterialNetworkSchema {
    container: ContainerHandle,
}

impl MaterialNetworkSchema {
    pub fn node_names(&self) -> Vec<Token> {
        container_child(&self.container, NODES)
            .map(|c| c.names())
            .unwrap_or_default()
    }

    pub fn node(&self, path: &str) -> Option<MaterialNodeSchema> {
        container_child(&self.container, NODES)
            .and_then(|c| container_child(&c, path))
            .map(|container| MaterialNodeSchema { container })
    }

    pub fn terminal(&self, name: &str) -> Option<MaterialConnectionSchema> {
        container_child(&self.container, TERMINALS)
            .and_then(|c| container_child(&c, name))
            .map(|container| MaterialConnectionSchema { container })
    }

    pub fn build_retained(nodes: ContainerHandle, terminals: ContainerHandle) -> ContainerHandle {
        RetainedContainerDataSource::new([
            (NODES, DataSource::Container(nodes)),
            (TERMINALS, DataSource::Container(terminals)),
        ])
    }
}

#[derive(Clone)]
pub struct MaterialNodeSchema {
    container: ContainerHandle,
}

impl MaterialNodeSchema {
    pub fn node_identifier(&self) -> Option<Token> {
        typed_child(&self.container, NODE_IDENTIFIER)
    }

    /// Value of parameter `name`.
    pub fn parameter(&self, name: &str) -> Option<SampledHandle> {
        container_child(&self.container, PARAMETERS)
            .and_then(|c| container_child(&c, name))
            .and_then(|c| sampled_child(&c, PARAMETER_VALUE))
    }

    /// Connections feeding input `name`, in authored order.
    pub fn input_connections(&self, name: &str) -> Vec<MaterialConnectionSchema> {
        let Some(vector) = container_child(&self.container, INPUT_CONNECTIONS)
            .and_then(|c| c.get(&Token::new(name)))
            .and_then(|ds| ds.as_vector().cloned())
        else {
            return Vec::new();
        };
        (0..vector.len())
            .filter_map(|i| vector.element(i))
            .filter_map(DataSource::into_container)
            .map(|container| MaterialConnectionSchema { container })
            .collect()
    }

    pub fn build_retained(
        identifier: Token,
        parameters: ContainerHandle,
        input_connections: ContainerHandle,
    ) -> ContainerHandle {
        RetainedContainerDataSource::new([
            (PARAMETERS, DataSource::Container(parameters)),
            (INPUT_CONNECTIONS, DataSource::Container(input_connections)),
            (NODE_IDENTIFIER, retained_value(identifier)),
        ])
    }
}

pub struct MaterialNodeParameterSchema;

impl MaterialNodeParameterSchema {
    pub fn build_retained(value: Value) -> ContainerHandle {
        RetainedContainerDataSource::new([(PARAMETER_VALUE, retained_value(value))])
    }
}

#[derive(Clone)]
pub struct MaterialConnectionSchema {
    container: ContainerHandle,
}

impl MaterialConnectionSchema {
    pub fn upstream_node_path(&self) -> Option<Token> {
        typed_child(&self.container, UPSTREAM_NODE_PATH)
    }

    pub fn upstream_node_output_name(&self) -> Option<Token> {
        typed_child(&self.container, UPSTREAM_NODE_OUTPUT_NAME)
    }

    pub fn build_retained(upstream_node_path: Token, upstream_node_output_name: Token) -> ContainerHandle {
        RetainedContainerDataSource::new([
            (UPSTREAM_NODE_PATH, retained_value(upstream_node_path)),
            (UPSTREAM_NODE_OUTPUT_NAME, retained_value(upstream_node_output_name)),
        ])
    }
}
