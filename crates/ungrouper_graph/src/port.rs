// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port (socket) definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type carried by a socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Scalar value
    Float,
    /// 3D vector
    Vector,
    /// Color (RGBA)
    Color,
    /// Shader closure reference
    Shader,
    /// String value
    String,
    /// Any type (reroutes and other passthrough sockets)
    Any,
    /// Custom type
    Custom(String),
}

impl PortType {
    /// Whether values of this type convert implicitly into each other
    fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Float | Self::Vector | Self::Color
        )
    }

    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        // Scalars, vectors and colors are converted implicitly by the shader compiler
        self.is_numeric() && other.is_numeric()
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Literal value used when the socket is not linked
    pub default_value: Option<PortValue>,
    /// Whether multiple connections are allowed
    pub multi_connect: bool,
}

impl Port {
    /// Create a new port
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        port_type: PortType,
        direction: PortDirection,
    ) -> Self {
        let multi_connect = direction == PortDirection::Output;
        Self {
            id,
            name: name.into(),
            direction,
            port_type,
            default_value: None,
            multi_connect,
        }
    }

    /// Create a new input port
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(PortId::new(), name, port_type, PortDirection::Input)
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self::new(PortId::new(), name, port_type, PortDirection::Output)
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Same port with a freshly generated ID
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: PortId::new(),
            ..self.clone()
        }
    }

    /// Same port with the opposite direction and a fresh ID.
    ///
    /// Group boundary sockets are mirrored: an output of the interior
    /// `group_input` node is an input on the group node itself.
    pub fn mirrored(&self) -> Self {
        let direction = match self.direction {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        };
        let mut port = Self::new(PortId::new(), self.name.clone(), self.port_type.clone(), direction);
        port.default_value = self.default_value.clone();
        port
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        if self.direction == other.direction {
            return false;
        }

        self.port_type.can_connect_to(&other.port_type)
    }
}

/// Literal value stored on a socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 3D vector
    Vector([f32; 3]),
    /// Color
    Color([f32; 4]),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Bool(_) => PortType::Bool,
            Self::Int(_) => PortType::Int,
            Self::Float(_) => PortType::Float,
            Self::Vector(_) => PortType::Vector,
            Self::Color(_) => PortType::Color,
            Self::String(_) => PortType::String,
        }
    }

    /// Read the value as a scalar, converting the way the shader compiler does
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f32),
            Self::Float(f) => Some(*f),
            // Vector and color average down to a scalar
            Self::Vector(v) => Some((v[0] + v[1] + v[2]) / 3.0),
            Self::Color(c) => Some((c[0] + c[1] + c[2]) / 3.0),
            Self::String(_) => None,
        }
    }

    /// Read the value as a 3D vector
    pub fn as_vector(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vector(v) => Some(*v),
            Self::Color(c) => Some([c[0], c[1], c[2]]),
            Self::String(_) => None,
            other => other.as_float().map(|f| [f, f, f]),
        }
    }

    /// Read the value as an RGBA color
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Vector(v) => Some([v[0], v[1], v[2], 1.0]),
            Self::String(_) => None,
            other => other.as_float().map(|f| [f, f, f, 1.0]),
        }
    }

    /// Read the value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}
