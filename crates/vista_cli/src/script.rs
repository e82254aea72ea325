// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoring scripts.
//!
//! A script is a RON document holding a list of statements that are run
//! top to bottom against one scene. Argument values may be nested calls,
//! which are constructed first and passed on as handles, or references to
//! handles bound by earlier statements.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use vista_scene::{ArgValue, Args, NodeId, Scene, SceneError};

/// Errors raised while loading or running a script
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script file could not be read
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),

    /// Script text is not valid RON
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A reference names no earlier binding
    #[error("Unbound name `{0}`")]
    Unbound(String),

    /// The scene rejected a call
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A statement failed
    #[error("Statement {index} failed: {source}")]
    Statement {
        /// Zero-based statement index
        index: usize,
        /// Underlying failure
        source: Box<ScriptError>,
    },
}

/// Argument value as written in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Plain numbers (vector, color, Euler angles, flattened matrix)
    List(Vec<f64>),
    /// Matrix rows
    Rows(Vec<Vec<f64>>),
    /// String or mode name
    Str(String),
    /// Handle bound by an earlier statement
    Ref(String),
    /// Inline construction; its handle becomes the value
    Call {
        /// Node type name
        #[serde(rename = "type")]
        node_type: String,
        /// Keyword arguments
        #[serde(default)]
        args: IndexMap<String, ScriptValue>,
    },
}

/// One script statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Construct a node
    Call {
        /// Node type name
        #[serde(rename = "type")]
        node_type: String,
        /// Keyword arguments
        #[serde(default)]
        args: IndexMap<String, ScriptValue>,
        /// Name to bind the resulting handle to
        #[serde(default)]
        bind: Option<String>,
        /// Also register an embeddable node
        #[serde(default)]
        register: bool,
    },
    /// Construct a node from another node's call
    Derive {
        /// Binding of the source node
        source: String,
        /// Overriding arguments
        #[serde(default)]
        args: IndexMap<String, ScriptValue>,
        /// Name to bind the resulting handle to
        #[serde(default)]
        bind: Option<String>,
    },
    /// Set an ambient default
    SetDefault {
        /// Attribute name
        attribute: String,
        /// Default value
        value: ScriptValue,
        /// Restrict the default to one node type
        #[serde(default)]
        only: Option<String>,
    },
    /// Drop an ambient default
    ClearDefault {
        /// Attribute name
        attribute: String,
    },
    /// Register a bound embeddable node
    Register {
        /// Binding name
        target: String,
    },
    /// Remove a bound node
    Remove {
        /// Binding name
        target: String,
    },
    /// Change an attribute after construction (always rejected)
    Set {
        /// Binding name
        target: String,
        /// Attribute name
        attribute: String,
        /// New value
        value: ScriptValue,
    },
}

/// A parsed authoring script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Scene name to use instead of the session default
    #[serde(default)]
    pub name: Option<String>,
    /// Statements in execution order
    pub statements: Vec<Statement>,
}

impl Script {
    /// Serialize to RON format
    #[allow(dead_code)] // Intentionally kept for API completeness
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load a script file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_ron(&contents)?)
    }
}

/// Outcome of a script run that was not aborted
#[derive(Debug, Default)]
pub struct RunReport {
    /// Statements that completed
    pub executed: usize,
    /// Failures of the statements that did not
    pub failed: Vec<ScriptError>,
}

impl RunReport {
    /// Check if every statement completed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Executes scripts against a scene
pub struct Runner<'a> {
    scene: &'a mut Scene,
    bindings: IndexMap<String, NodeId>,
    abort_on_error: bool,
}

impl<'a> Runner<'a> {
    /// Create a runner that stops at the first failing statement
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            bindings: IndexMap::new(),
            abort_on_error: true,
        }
    }

    /// Choose whether a failing statement stops the run
    pub fn abort_on_error(mut self, abort: bool) -> Self {
        self.abort_on_error = abort;
        self
    }

    /// Handle bound to a name
    pub fn binding(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(name).copied()
    }

    /// All bindings in binding order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.bindings.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Install initial ambient defaults
    pub fn apply_defaults(
        &mut self,
        defaults: &IndexMap<String, ScriptValue>,
    ) -> Result<(), ScriptError> {
        for (attribute, value) in defaults {
            let value = self.value(value)?;
            self.scene.set_default(attribute, value)?;
        }
        Ok(())
    }

    /// Run every statement of a script
    pub fn run(&mut self, script: &Script) -> Result<RunReport, ScriptError> {
        let mut report = RunReport::default();
        for (index, statement) in script.statements.iter().enumerate() {
            match self.execute(statement) {
                Ok(()) => report.executed += 1,
                Err(err) => {
                    let err = ScriptError::Statement {
                        index,
                        source: Box::new(err),
                    };
                    if self.abort_on_error {
                        return Err(err);
                    }
                    tracing::warn!("{err}");
                    report.failed.push(err);
                }
            }
        }
        Ok(report)
    }

    /// Run one statement
    pub fn execute(&mut self, statement: &Statement) -> Result<(), ScriptError> {
        match statement {
            Statement::Call {
                node_type,
                args,
                bind,
                register,
            } => {
                let id = self.call(node_type, args, *register)?;
                self.bind(bind.as_deref(), id);
            }
            Statement::Derive { source, args, bind } => {
                let source = self.lookup(source)?;
                let args = self.args(args)?;
                let id = self.scene.derive(source, args)?;
                self.bind(bind.as_deref(), id);
            }
            Statement::SetDefault {
                attribute,
                value,
                only,
            } => {
                let value = self.value(value)?;
                match only {
                    Some(node_type) => self.scene.set_default_for(node_type, attribute, value)?,
                    None => self.scene.set_default(attribute, value)?,
                }
            }
            Statement::ClearDefault { attribute } => self.scene.clear_default(attribute),
            Statement::Register { target } => {
                let id = self.lookup(target)?;
                self.scene.register(id)?;
            }
            Statement::Remove { target } => {
                let id = self.lookup(target)?;
                self.scene.remove(id)?;
            }
            Statement::Set {
                target,
                attribute,
                value,
            } => {
                let id = self.lookup(target)?;
                let value = self.value(value)?;
                self.scene.set_attribute(id, attribute, value)?;
            }
        }
        Ok(())
    }

    fn call(
        &mut self,
        node_type: &str,
        args: &IndexMap<String, ScriptValue>,
        register: bool,
    ) -> Result<NodeId, ScriptError> {
        // Inline calls in the arguments are constructed before this one
        let args = self.args(args)?;
        let mut construction = self.scene.begin_named(node_type)?.args(args);
        if register {
            construction = construction.registered();
        }
        Ok(self.scene.finish(construction)?)
    }

    fn args(&mut self, args: &IndexMap<String, ScriptValue>) -> Result<Args, ScriptError> {
        let mut resolved = Args::new();
        for (name, value) in args {
            let value = self.value(value)?;
            resolved.set(name.as_str(), value);
        }
        Ok(resolved)
    }

    fn value(&mut self, value: &ScriptValue) -> Result<ArgValue, ScriptError> {
        Ok(match value {
            ScriptValue::Bool(b) => ArgValue::Bool(*b),
            ScriptValue::Int(i) => ArgValue::Int(*i),
            ScriptValue::Float(v) => ArgValue::Float(*v),
            ScriptValue::List(values) => ArgValue::List(values.clone()),
            ScriptValue::Rows(rows) => ArgValue::Rows(rows.clone()),
            ScriptValue::Str(s) => ArgValue::String(s.clone()),
            ScriptValue::Ref(name) => ArgValue::Handle(self.lookup(name)?),
            ScriptValue::Call { node_type, args } => {
                ArgValue::Handle(self.call(node_type, args, false)?)
            }
        })
    }

    fn lookup(&self, name: &str) -> Result<NodeId, ScriptError> {
        self.binding(name)
            .ok_or_else(|| ScriptError::Unbound(name.to_string()))
    }

    fn bind(&mut self, name: Option<&str>, id: NodeId) {
        let Some(name) = name else {
            return;
        };
        if self.bindings.insert(name.to_string(), id).is_some() {
            tracing::debug!(binding = name, "rebound name");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_scene::NodeKind;

    const STUDIO: &str = r#"
        Script(
            name: Some("studio"),
            statements: [
                SetDefault(attribute: "segments", value: Int(32)),
                Call(type: "Camera", args: {"pos": List([3.0, 2.0, 2.0]), "target": List([0.0, 0.0, 0.0])}),
                Call(type: "SpotLight", args: {"pos": List([2.0, 4.0, 2.0]), "shadow": Bool(true)}),
                Call(type: "PointLight", args: {"intensity": Float(0.3)}),
                Call(type: "Material", bind: Some("red"), args: {"color": List([0.9, 0.1, 0.1])}),
                Call(type: "Sphere", bind: Some("ball"), args: {
                    "radius": Float(0.5),
                    "material": Call(type: "Material", args: {"shininess": Float(80.0)}),
                }),
                Call(type: "Box", bind: Some("crate"), args: {"material": Ref("red")}),
                Call(type: "Plane", args: {"material": Ref("red"), "lx": Int(10)}),
            ],
        )
    "#;

    fn run(text: &str, abort: bool) -> (Scene, Result<RunReport, ScriptError>, IndexMap<String, NodeId>) {
        let script = Script::from_ron(text).unwrap();
        let mut scene = Scene::new(script.name.clone().unwrap_or_default());
        let (report, bindings) = {
            let mut runner = Runner::new(&mut scene).abort_on_error(abort);
            let report = runner.run(&script);
            let bindings = runner
                .bindings()
                .map(|(name, id)| (name.to_string(), id))
                .collect();
            (report, bindings)
        };
        (scene, report, bindings)
    }

    #[test]
    fn test_studio_script() {
        let (scene, report, bindings) = run(STUDIO, true);
        let report = report.unwrap();
        assert_eq!(report.executed, 8);
        assert!(report.is_clean());

        let types: Vec<_> = scene.all().map(|node| node.type_name()).collect();
        assert_eq!(types, ["Camera", "SpotLight", "PointLight", "Sphere", "Box", "Plane"]);

        let ball = scene.lookup(bindings["ball"]).unwrap();
        assert_eq!(ball.attributes().int("segments"), Some(32));
        let inline = scene.lookup(ball.material().unwrap()).unwrap();
        assert_eq!(inline.kind(), NodeKind::Material);
        assert_eq!(inline.attributes().float("shininess"), Some(80.0));
    }

    #[test]
    fn test_references_share_one_material() {
        let (scene, _, bindings) = run(STUDIO, true);
        let red = bindings["red"];
        assert_eq!(scene.lookup(bindings["crate"]).unwrap().material(), Some(red));
        assert_eq!(scene.users_of(red).len(), 2);
    }

    #[test]
    fn test_set_is_rejected_but_run_continues() {
        let text = r#"
            Script(statements: [
                Call(type: "Material", bind: Some("m")),
                Set(target: "m", attribute: "color", value: List([0.0, 1.0, 0.0])),
                Call(type: "Torus", args: {"material": Ref("m")}),
            ])
        "#;
        let (scene, report, _) = run(text, false);
        let report = report.unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            &report.failed[0],
            ScriptError::Statement { index: 1, source }
                if matches!(**source, ScriptError::Scene(SceneError::Immutable { .. }))
        ));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let text = r#"
            Script(statements: [
                Call(type: "Camera"),
                Call(type: "PointLight", args: {"brightness": Float(2.0)}),
                Call(type: "Sphere"),
            ])
        "#;
        let (scene, report, _) = run(text, true);
        assert!(matches!(report, Err(ScriptError::Statement { index: 1, .. })));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_unbound_reference() {
        let text = r#"Script(statements: [Call(type: "Box", args: {"material": Ref("missing")})])"#;
        let (scene, report, _) = run(text, true);
        let err = report.unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Statement { ref source, .. } if matches!(**source, ScriptError::Unbound(ref name) if name == "missing")
        ));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_failed_inline_call_constructs_nothing_outer() {
        let text = r#"
            Script(statements: [
                Call(type: "Sphere", args: {
                    "material": Call(type: "Material", args: {"blend": Str("screen")}),
                }),
            ])
        "#;
        let (scene, report, _) = run(text, true);
        assert!(report.is_err());
        assert!(scene.is_empty());
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_register_remove_and_derive() {
        let text = r#"
            Script(statements: [
                Call(type: "Material", bind: Some("gold"), args: {"color": List([1.0, 0.8, 0.2])}),
                Register(target: "gold"),
                Call(type: "Cylinder", bind: Some("post"), args: {"height": Float(4.0), "material": Ref("gold")}),
                Derive(source: "post", bind: Some("twin"), args: {"pos": List([2.0, 0.0, 0.0])}),
                Remove(target: "post"),
            ])
        "#;
        let (scene, report, bindings) = run(text, true);
        assert!(report.unwrap().is_clean());

        let order: Vec<_> = scene.all().map(|node| node.id()).collect();
        assert_eq!(order, [bindings["gold"], bindings["twin"]]);

        let twin = scene.lookup(bindings["twin"]).unwrap();
        assert_eq!(twin.attributes().float("height"), Some(4.0));
        assert_eq!(twin.material(), Some(bindings["gold"]));
    }

    #[test]
    fn test_scoped_default_statement() {
        let text = r#"
            Script(statements: [
                SetDefault(attribute: "intensity", value: Float(0.5), only: Some("PointLight")),
                Call(type: "PointLight", bind: Some("p")),
                Call(type: "DistantLight", bind: Some("d")),
                ClearDefault(attribute: "intensity"),
                Call(type: "PointLight", bind: Some("q")),
            ])
        "#;
        let (scene, _, bindings) = run(text, true);
        let intensity = |name: &str| scene.lookup(bindings[name]).unwrap().attributes().float("intensity");
        assert_eq!(intensity("p"), Some(0.5));
        assert_eq!(intensity("d"), Some(1.0));
        assert_eq!(intensity("q"), Some(1.0));
    }

    #[test]
    fn test_apply_defaults() {
        let mut scene = Scene::default();
        let mut defaults = IndexMap::new();
        defaults.insert("segments".to_string(), ScriptValue::Int(12));

        let disk = {
            let mut runner = Runner::new(&mut scene);
            runner.apply_defaults(&defaults).unwrap();
            runner
                .execute(&Statement::Call {
                    node_type: "Disk".to_string(),
                    args: IndexMap::new(),
                    bind: Some("disk".to_string()),
                    register: false,
                })
                .unwrap();
            runner.binding("disk").unwrap()
        };

        assert_eq!(scene.lookup(disk).unwrap().attributes().int("segments"), Some(12));
    }

    #[test]
    fn test_script_survives_ron_round_trip() {
        let script = Script::from_ron(STUDIO).unwrap();
        let text = script.to_ron().unwrap();
        assert_eq!(Script::from_ron(&text).unwrap(), script);
    }
}
