//! One-time prototype loading.
//!
//! Every lane is cloned from three prototype nodes (`Track`, `Ball`, `Pin`)
//! found at the root of the scene. No player can join until they resolve.

use crate::error::InitError;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;

pub const TRACK_NODE: &str = "Track";
pub const BALL_NODE: &str = "Ball";
pub const PIN_NODE: &str = "Pin";

/// Index of a prototype node in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrototypeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrototypeSet {
    pub track: PrototypeId,
    pub ball: PrototypeId,
    pub pin: PrototypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub index: usize,
    pub name: String,
}

impl PrototypeSet {
    pub fn resolve(nodes: &[SceneNode]) -> Result<Self, InitError> {
        let find = |name: &'static str| {
            nodes
                .iter()
                .find(|node| node.name == name)
                .map(|node| PrototypeId(node.index))
                .ok_or(InitError::MissingPrototype(name))
        };
        Ok(Self {
            track: find(TRACK_NODE)?,
            ball: find(BALL_NODE)?,
            pin: find(PIN_NODE)?,
        })
    }
}

/// Where the root scene nodes come from.
pub trait SceneSource {
    fn root_nodes(&self) -> impl Future<Output = Result<Vec<SceneNode>, InitError>> + Send;
}

/// Scene with exactly the three prototypes, for headless runs.
pub struct BuiltinScene;

impl SceneSource for BuiltinScene {
    async fn root_nodes(&self) -> Result<Vec<SceneNode>, InitError> {
        Ok([TRACK_NODE, BALL_NODE, PIN_NODE]
            .iter()
            .enumerate()
            .map(|(index, name)| SceneNode {
                index,
                name: name.to_string(),
            })
            .collect())
    }
}

/// A `.gltf` (JSON) scene file on disk.
pub struct GltfScene {
    path: PathBuf,
}

impl GltfScene {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SceneSource for GltfScene {
    async fn root_nodes(&self) -> Result<Vec<SceneNode>, InitError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| InitError::SceneLoad(format!("{}: {}", self.path.display(), e)))?;
        parse_gltf_root_nodes(&text)
    }
}

#[derive(Deserialize)]
struct GltfDocument {
    #[serde(default)]
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<GltfSceneDef>,
    #[serde(default)]
    nodes: Vec<GltfNode>,
}

#[derive(Deserialize)]
struct GltfSceneDef {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Deserialize)]
struct GltfNode {
    #[serde(default)]
    name: Option<String>,
}

/// Named root nodes of the default scene (all nodes if the file has no scenes).
pub fn parse_gltf_root_nodes(text: &str) -> Result<Vec<SceneNode>, InitError> {
    let doc: GltfDocument =
        serde_json::from_str(text).map_err(|e| InitError::SceneLoad(e.to_string()))?;

    let roots: Vec<usize> = match doc.scenes.get(doc.scene.unwrap_or(0)) {
        Some(scene) => scene.nodes.clone(),
        None => (0..doc.nodes.len()).collect(),
    };

    Ok(roots
        .into_iter()
        .filter_map(|index| {
            let name = doc.nodes.get(index)?.name.clone()?;
            Some(SceneNode { index, name })
        })
        .collect())
}

pub async fn load_prototypes<S: SceneSource>(source: &S) -> Result<PrototypeSet, InitError> {
    let nodes = source.root_nodes().await?;
    let prototypes = PrototypeSet::resolve(&nodes)?;
    tracing::info!(
        "Lane prototypes loaded (track={}, ball={}, pin={})",
        prototypes.track.0,
        prototypes.ball.0,
        prototypes.pin.0
    );
    Ok(prototypes)
}
