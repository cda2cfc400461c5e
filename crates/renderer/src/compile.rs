use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

use crate::waves::{
    self, WaveGroup, AMPLITUDE, AMPLITUDE_RATE, BEND_FALLOFF, BEND_STRENGTH, DRIFT_RATE,
    GLOW_BIAS, GLOW_INTENSITY, TIME_SCALE, WAVES_PER_GROUP, WAVE_GROUPS,
};

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Compiles the wave fragment shader through naga's GLSL frontend.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    let source = wave_fragment_source();
    tracing::trace!(bytes = source.len(), "compiling wave fragment shader");

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("wavepaper fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Produces the complete GLSL fragment program.
///
/// Steps performed:
///
/// 1. Emit [`HEADER`] with the `WaveParams` uniform block and name aliases.
/// 2. Emit colour and tuning constants from [`crate::waves`].
/// 3. Emit [`WAVE_FUNCTIONS`], then a `main` with one loop per wave group.
pub(crate) fn wave_fragment_source() -> String {
    let mut source = String::with_capacity(4096);
    source.push_str(HEADER);

    source.push_str(&format!(
        "const vec3 BLACK = {};\n",
        glsl_vec3(waves::BACKGROUND)
    ));
    source.push_str(&format!(
        "const vec3 BLUE = {};\n",
        glsl_rgb8(waves::GRADIENT_LEFT_RGB8)
    ));
    source.push_str(&format!(
        "const vec3 PINK = {};\n",
        glsl_rgb8(waves::GRADIENT_RIGHT_RGB8)
    ));
    for (name, value) in [
        ("TIME_SCALE", TIME_SCALE),
        ("AMPLITUDE", AMPLITUDE),
        ("AMPLITUDE_RATE", AMPLITUDE_RATE),
        ("DRIFT_RATE", DRIFT_RATE),
        ("BEND_STRENGTH", BEND_STRENGTH),
        ("BEND_FALLOFF", BEND_FALLOFF),
        ("GLOW_INTENSITY", GLOW_INTENSITY),
        ("GLOW_BIAS", GLOW_BIAS),
    ] {
        source.push_str(&format!("const float {name} = {};\n", glsl_float(value)));
    }
    source.push('\n');
    source.push_str(WAVE_FUNCTIONS);

    source.push_str(MAIN_PROLOGUE);
    for group in &WAVE_GROUPS {
        source.push_str(&group_loop(group));
    }
    source.push_str(MAIN_EPILOGUE);
    source
}

fn group_loop(group: &WaveGroup) -> String {
    let twist = glsl_float(group.twist);
    let mut lines = vec![
        format!("    // {} waves", group.name),
        format!("    for (int i = 0; i < {WAVES_PER_GROUP}; i++) {{"),
        "        float fi = float(i);".to_string(),
        format!("        vec2 ruv = uv * rotate({twist} * log(length(uv) + 1.0));"),
    ];
    if group.mirror_x {
        lines.push("        ruv.x *= -1.0;".to_string());
    }
    lines.push(format!(
        concat!(
            "        col += waveColor * wave(",
            "ruv + vec2({spacing} * fi + {ox}, {oy}), ",
            "{phase} + {step} * fi, ",
            "uv, mouseUv, BEND_STRENGTH) * {weight};",
        ),
        spacing = glsl_float(waves::LINE_SPACING),
        ox = glsl_float(group.origin[0]),
        oy = glsl_float(group.origin[1]),
        phase = glsl_float(group.phase),
        step = glsl_float(group.phase_step),
        weight = glsl_float(group.weight),
    ));
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\n")
}

/// Formats a float so GLSL always parses it as a floating-point literal.
fn glsl_float(value: f32) -> String {
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

fn glsl_vec3(value: [f32; 3]) -> String {
    format!(
        "vec3({}, {}, {})",
        glsl_float(value[0]),
        glsl_float(value[1]),
        glsl_float(value[2])
    )
}

fn glsl_rgb8(value: [u8; 3]) -> String {
    format!(
        "vec3({}, {}, {}) / 255.0",
        glsl_float(value[0] as f32),
        glsl_float(value[1] as f32),
        glsl_float(value[2] as f32)
    )
}

/// GLSL prologue declaring the inputs, outputs, and uniform block.
///
/// The uniform block layout must match [`crate::gpu::WaveUniforms`].
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform WaveParams {
    vec3 _iResolution;
    float _iTime;
    vec2 _iMouse;
    float _bendInfluence;
    float _padding0;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iMouse ubo._iMouse
#define bendInfluence ubo._bendInfluence

";

const WAVE_FUNCTIONS: &str = r"mat2 rotate(float r) {
    return mat2(cos(r), sin(r), -sin(r), cos(r));
}

float wave(vec2 uv, float offset, vec2 screenUv, vec2 mouseUv, float bendStrength) {
    float time = iTime * TIME_SCALE;
    float amp = sin(offset + time * AMPLITUDE_RATE) * AMPLITUDE;
    float y = sin(uv.x + offset + time * DRIFT_RATE) * amp;

    vec2 d = screenUv - mouseUv;
    float influence = exp(-dot(d, d) * BEND_FALLOFF);
    y += (mouseUv.y - screenUv.y) * influence * bendStrength * bendInfluence;

    return GLOW_INTENSITY / (abs(uv.y - y) + GLOW_BIAS);
}

";

const MAIN_PROLOGUE: &str = r"void main() {
    // Remap the builtin top-left origin to a bottom-left one.
    vec2 fragCoord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);

    vec2 uv = (2.0 * fragCoord - iResolution.xy) / iResolution.y;
    uv.y *= -1.0;
    vec2 mouseUv = (2.0 * iMouse - iResolution.xy) / iResolution.y;
    mouseUv.y *= -1.0;

    vec3 col = BLACK;
    vec3 waveColor = mix(BLUE, PINK, fragCoord.x / iResolution.x);

";

const MAIN_EPILOGUE: &str = r"    outColor = vec4(col, 1.0);
}
";

/// Minimal full-screen triangle vertex shader.
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
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
