// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node types found in material trees.
//!
//! Group, reroute and boundary nodes are built with their own constructors
//! on [`Node`](crate::node::Node) because their sockets depend on the group
//! interface; everything else is instantiated from this registry.

use crate::node::{types, NodeCategory, NodeRegistry, NodeType};
use crate::port::{Port, PortType, PortValue};

/// Vector math operation used for vector placeholders
pub const VECTOR_MATH_ADD: &str = "ADD";

/// Create the shader node registry
pub fn create_shader_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output Nodes
    // ========================================================================

    registry.register(NodeType {
        id: "material_output".to_string(),
        name: "Material Output".to_string(),
        category: NodeCategory::Output,
        description: "Final surface, volume and displacement of the material".to_string(),
        inputs: vec![
            Port::input("Surface", PortType::Shader),
            Port::input("Volume", PortType::Shader),
            Port::input("Displacement", PortType::Vector).with_default(PortValue::Vector([0.0, 0.0, 0.0])),
        ],
        outputs: vec![],
    });

    // ========================================================================
    // Input Nodes - Literal sources
    // ========================================================================

    registry.register(NodeType {
        id: types::VALUE.to_string(),
        name: "Value".to_string(),
        category: NodeCategory::Input,
        description: "Constant scalar value".to_string(),
        inputs: vec![],
        outputs: vec![Port::output("Value", PortType::Float).with_default(PortValue::Float(0.5))],
    });

    registry.register(NodeType {
        id: types::RGB.to_string(),
        name: "RGB".to_string(),
        category: NodeCategory::Input,
        description: "Constant color value".to_string(),
        inputs: vec![],
        outputs: vec![
            Port::output("Color", PortType::Color).with_default(PortValue::Color([0.5, 0.5, 0.5, 1.0])),
        ],
    });

    registry.register(NodeType {
        id: types::UV_MAP.to_string(),
        name: "UV Map".to_string(),
        category: NodeCategory::Input,
        description: "Coordinates from a named UV layer".to_string(),
        inputs: vec![],
        outputs: vec![Port::output("UV", PortType::Vector)],
    });

    registry.register(NodeType {
        id: "texture_coordinate".to_string(),
        name: "Texture Coordinate".to_string(),
        category: NodeCategory::Input,
        description: "Generated, normal and UV coordinates".to_string(),
        inputs: vec![],
        outputs: vec![
            Port::output("Generated", PortType::Vector),
            Port::output("Normal", PortType::Vector),
            Port::output("UV", PortType::Vector),
            Port::output("Object", PortType::Vector),
        ],
    });

    // ========================================================================
    // Shader Nodes
    // ========================================================================

    registry.register(NodeType {
        id: "principled_bsdf".to_string(),
        name: "Principled BSDF".to_string(),
        category: NodeCategory::Shader,
        description: "Physically based surface shader".to_string(),
        inputs: vec![
            Port::input("Base Color", PortType::Color).with_default(PortValue::Color([0.8, 0.8, 0.8, 1.0])),
            Port::input("Metallic", PortType::Float).with_default(PortValue::Float(0.0)),
            Port::input("Roughness", PortType::Float).with_default(PortValue::Float(0.5)),
            Port::input("IOR", PortType::Float).with_default(PortValue::Float(1.45)),
            Port::input("Alpha", PortType::Float).with_default(PortValue::Float(1.0)),
            Port::input("Normal", PortType::Vector),
            Port::input("Emission Color", PortType::Color).with_default(PortValue::Color([0.0, 0.0, 0.0, 1.0])),
            Port::input("Emission Strength", PortType::Float).with_default(PortValue::Float(0.0)),
        ],
        outputs: vec![Port::output("BSDF", PortType::Shader)],
    });

    registry.register(NodeType {
        id: "emission".to_string(),
        name: "Emission".to_string(),
        category: NodeCategory::Shader,
        description: "Light emitting surface".to_string(),
        inputs: vec![
            Port::input("Color", PortType::Color).with_default(PortValue::Color([1.0, 1.0, 1.0, 1.0])),
            Port::input("Strength", PortType::Float).with_default(PortValue::Float(1.0)),
        ],
        outputs: vec![Port::output("Emission", PortType::Shader)],
    });

    registry.register(NodeType {
        id: "mix_shader".to_string(),
        name: "Mix Shader".to_string(),
        category: NodeCategory::Shader,
        description: "Blend two shaders by a factor".to_string(),
        inputs: vec![
            Port::input("Fac", PortType::Float).with_default(PortValue::Float(0.5)),
            Port::input("Shader", PortType::Shader),
            Port::input("Shader", PortType::Shader),
        ],
        outputs: vec![Port::output("Shader", PortType::Shader)],
    });

    // ========================================================================
    // Texture Nodes
    // ========================================================================

    registry.register(NodeType {
        id: "image_texture".to_string(),
        name: "Image Texture".to_string(),
        category: NodeCategory::Texture,
        description: "Sample an image".to_string(),
        inputs: vec![Port::input("Vector", PortType::Vector)],
        outputs: vec![
            Port::output("Color", PortType::Color),
            Port::output("Alpha", PortType::Float),
        ],
    });

    registry.register(NodeType {
        id: "noise_texture".to_string(),
        name: "Noise Texture".to_string(),
        category: NodeCategory::Texture,
        description: "Procedural Perlin noise".to_string(),
        inputs: vec![
            Port::input("Vector", PortType::Vector),
            Port::input("Scale", PortType::Float).with_default(PortValue::Float(5.0)),
            Port::input("Detail", PortType::Float).with_default(PortValue::Float(2.0)),
        ],
        outputs: vec![
            Port::output("Fac", PortType::Float),
            Port::output("Color", PortType::Color),
        ],
    });

    // ========================================================================
    // Color, Vector and Converter Nodes
    // ========================================================================

    registry.register(NodeType {
        id: "mix_rgb".to_string(),
        name: "Mix".to_string(),
        category: NodeCategory::Color,
        description: "Blend two colors".to_string(),
        inputs: vec![
            Port::input("Fac", PortType::Float).with_default(PortValue::Float(0.5)),
            Port::input("Color1", PortType::Color).with_default(PortValue::Color([0.5, 0.5, 0.5, 1.0])),
            Port::input("Color2", PortType::Color).with_default(PortValue::Color([0.5, 0.5, 0.5, 1.0])),
        ],
        outputs: vec![Port::output("Color", PortType::Color)],
    });

    registry.register(NodeType {
        id: types::VECTOR_MATH.to_string(),
        name: "Vector Math".to_string(),
        category: NodeCategory::Vector,
        description: "Per-component vector arithmetic".to_string(),
        inputs: vec![
            Port::input("Vector", PortType::Vector).with_default(PortValue::Vector([0.0, 0.0, 0.0])),
            Port::input("Vector", PortType::Vector).with_default(PortValue::Vector([0.0, 0.0, 0.0])),
        ],
        outputs: vec![
            Port::output("Vector", PortType::Vector),
            Port::output("Value", PortType::Float),
        ],
    });

    registry.register(NodeType {
        id: "normal_map".to_string(),
        name: "Normal Map".to_string(),
        category: NodeCategory::Vector,
        description: "Tangent space normal from a color".to_string(),
        inputs: vec![
            Port::input("Strength", PortType::Float).with_default(PortValue::Float(1.0)),
            Port::input("Color", PortType::Color).with_default(PortValue::Color([0.5, 0.5, 1.0, 1.0])),
        ],
        outputs: vec![Port::output("Normal", PortType::Vector)],
    });

    registry.register(NodeType {
        id: "math".to_string(),
        name: "Math".to_string(),
        category: NodeCategory::Converter,
        description: "Scalar arithmetic".to_string(),
        inputs: vec![
            Port::input("Value", PortType::Float).with_default(PortValue::Float(0.5)),
            Port::input("Value", PortType::Float).with_default(PortValue::Float(0.5)),
        ],
        outputs: vec![Port::output("Value", PortType::Float)],
    });

    registry.register(NodeType {
        id: "separate_color".to_string(),
        name: "Separate Color".to_string(),
        category: NodeCategory::Converter,
        description: "Split a color into channels".to_string(),
        inputs: vec![
            Port::input("Color", PortType::Color).with_default(PortValue::Color([0.8, 0.8, 0.8, 1.0])),
        ],
        outputs: vec![
            Port::output("Red", PortType::Float),
            Port::output("Green", PortType::Float),
            Port::output("Blue", PortType::Float),
        ],
    });

    registry
}
