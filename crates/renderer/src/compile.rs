use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::gpu::uniforms::{ParamKind, ParamLayout};

/// Name of the texture every effect samples its input from.
pub(crate) const IMAGE_PARAM: &str = "image";

/// An effect file split into its parameter declarations and GLSL body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EffectSource {
    pub params: Vec<(String, ParamKind)>,
    pub body: String,
}

impl EffectSource {
    pub fn layout(&self) -> ParamLayout {
        ParamLayout::std140(self.params.iter().map(|(name, kind)| (name.as_str(), *kind)))
    }
}

/// Splits an effect into parameters and body.
///
/// Top-level `uniform <type> <name>;` lines declare parameters and are
/// removed from the body. A declaration of `image` as `texture2d` or
/// `sampler2D` is accepted and dropped because the input texture is injected.
/// The body must define `vec4 mainImage(vec2 uv)`.
pub(crate) fn parse_effect(source: &str) -> Result<EffectSource, String> {
    let mut params: Vec<(String, ParamKind)> = Vec::new();
    let mut body = String::new();

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        let Some(decl) = trimmed.strip_prefix("uniform ") else {
            if trimmed.starts_with("#version") {
                continue;
            }
            body.push_str(line);
            body.push('\n');
            continue;
        };

        let line_no = index + 1;
        let decl = decl
            .trim()
            .strip_suffix(';')
            .ok_or_else(|| format!("line {line_no}: parameter declaration must end with ';'"))?;
        let mut parts = decl.split_whitespace();
        let (Some(ty), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!(
                "line {line_no}: expected `uniform <type> <name>;`, found `{trimmed}`"
            ));
        };

        if !is_identifier(name) {
            return Err(format!("line {line_no}: invalid parameter name '{name}'"));
        }
        if name == IMAGE_PARAM {
            if matches!(ty, "texture2d" | "sampler2D") {
                continue;
            }
            return Err(format!("line {line_no}: 'image' is reserved for the input texture"));
        }
        let kind = ParamKind::from_glsl(ty)
            .ok_or_else(|| format!("line {line_no}: unsupported parameter type '{ty}'"))?;
        if params.iter().any(|(existing, _)| existing == name) {
            return Err(format!("line {line_no}: duplicate parameter '{name}'"));
        }
        params.push((name.to_string(), kind));
    }

    if !body.contains("mainImage") {
        return Err("effect does not define `vec4 mainImage(vec2 uv)`".into());
    }

    Ok(EffectSource { params, body })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Produces a self-contained GLSL fragment shader from an effect.
///
/// The parameter block is declared with the same member order as
/// [`ParamLayout`], so std140 offsets agree with the CPU-side block. Each
/// parameter name is a macro over its block member; booleans compare the
/// stored `uint` against zero.
pub(crate) fn wrap_effect_fragment(effect: &EffectSource) -> String {
    let mut members = String::new();
    let mut aliases = String::new();
    for (name, kind) in &effect.params {
        members.push_str(&format!("    {} _{name};\n", kind.block_type()));
        match kind {
            ParamKind::Bool => {
                aliases.push_str(&format!("#define {name} (effect_params._{name} != 0u)\n"))
            }
            _ => aliases.push_str(&format!("#define {name} effect_params._{name}\n")),
        }
    }
    if effect.params.is_empty() {
        members.push_str("    vec4 _effect_reserved;\n");
    }

    format!(
        "{HEADER}\nlayout(std140, set = 0, binding = 0) uniform EffectParams {{\n{members}}} effect_params;\n\n{aliases}{IMAGE_BINDINGS}\n{body}{FOOTER}",
        body = effect.body
    )
}

pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    label: &str,
    wrapped: String,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;
";

const IMAGE_BINDINGS: &str = r"
layout(set = 0, binding = 1) uniform texture2D effect_image_texture;
layout(set = 0, binding = 2) uniform sampler effect_image_sampler;
#define image sampler2D(effect_image_texture, effect_image_sampler)
";

const FOOTER: &str = r"
void main() {
    outColor = mainImage(v_uv);
}
";

/// Full-screen triangle with a top-left UV origin.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = vec2(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
