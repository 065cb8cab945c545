use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiled vertex/fragment pair for one pipeline.
pub(crate) struct ShaderPair {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

fn glsl_module(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Compiles the full-screen gradient backdrop shaders.
pub(crate) fn compile_backdrop_shaders(device: &wgpu::Device) -> ShaderPair {
    ShaderPair {
        vertex: glsl_module(
            device,
            "backdrop vertex",
            BACKDROP_VERTEX_GLSL,
            ShaderStage::Vertex,
        ),
        fragment: glsl_module(
            device,
            "backdrop fragment",
            BACKDROP_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        ),
    }
}

/// Compiles the wave plane shaders.
pub(crate) fn compile_wave_shaders(device: &wgpu::Device) -> ShaderPair {
    ShaderPair {
        vertex: glsl_module(device, "wave vertex", WAVE_VERTEX_GLSL, ShaderStage::Vertex),
        fragment: glsl_module(
            device,
            "wave fragment",
            WAVE_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        ),
    }
}

/// Minimal full-screen triangle vertex shader.
const BACKDROP_VERTEX_GLSL: &str = r"#version 450
const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    gl_Position = vec4(positions[vertex_index], 0.0, 1.0);
}
";

/// Base gradient, pulsing overlay, and pointer streaks.
///
/// The uniform block must match `BackdropUniforms` in `gpu/uniforms.rs`, and
/// the gradient maths mirrors `fallback::FallbackFrame::shade`.
const BACKDROP_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform BackdropParams {
    vec4 base_from;
    vec4 base_to;
    vec4 overlay_from;
    vec4 overlay_to;
    vec4 streak_color;
    vec2 resolution;
    float overlay_opacity;
    float streak_mix;
    vec4 streaks[5];
} params;

void main() {
    vec2 uv = gl_FragCoord.xy / params.resolution;

    vec3 base = mix(params.base_from.rgb, params.base_to.rgb, clamp((uv.x + uv.y) * 0.5, 0.0, 1.0));
    vec3 overlay = mix(
        params.overlay_from.rgb,
        params.overlay_to.rgb,
        clamp((uv.x + 1.0 - uv.y) * 0.5, 0.0, 1.0)
    );
    vec3 color = mix(base, overlay, params.overlay_from.a * params.overlay_opacity);

    for (int i = 0; i < 5; i++) {
        vec4 streak = params.streaks[i];
        float center = streak.x * params.resolution.y + 0.5;
        float half_height = 0.5 * streak.z;
        float coverage = clamp(half_height + 0.5 - abs(gl_FragCoord.y - center), 0.0, 1.0);
        float local = uv.x - streak.y;
        float inside = step(0.0, local) * step(local, 1.0);
        float glow = 1.0 - abs(local * 2.0 - 1.0);
        float alpha = coverage * inside * glow * params.streak_color.a * params.streak_mix;
        color = mix(color, params.streak_color.rgb, alpha);
    }

    outColor = vec4(color, 1.0);
}
";

/// Wave plane vertex shader: base swell plus a ripple centred on the pointer.
const WAVE_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;

layout(std140, set = 0, binding = 0) uniform CameraParams {
    mat4 view_proj;
} camera;

layout(std140, set = 1, binding = 0) uniform PlaneParams {
    mat4 model;
    vec4 color_a;
    vec4 color_b;
    vec2 mouse;
    float time;
    float opacity;
} plane;

void main() {
    v_uv = a_uv;
    vec3 pos = a_position;

    float dist_x = pos.x - plane.mouse.x * 5.0;
    float dist_y = pos.y - plane.mouse.y * 5.0;
    float dist = sqrt(dist_x * dist_x + dist_y * dist_y);

    float wave = sin(dist * 1.0 - plane.time * 2.0) * 0.2;
    wave *= 1.0 - smoothstep(0.0, 2.0, dist);

    pos.z += sin(pos.x * 2.0 + plane.time) * 0.1;
    pos.z += sin(pos.y * 2.0 + plane.time) * 0.1;
    pos.z += wave;

    gl_Position = camera.view_proj * plane.model * vec4(pos, 1.0);
}
";

/// Wave plane fragment shader; writes premultiplied colour.
const WAVE_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 1, binding = 0) uniform PlaneParams {
    mat4 model;
    vec4 color_a;
    vec4 color_b;
    vec2 mouse;
    float time;
    float opacity;
} plane;

void main() {
    float dist_to_mouse = distance(v_uv, (plane.mouse + 1.0) * 0.5);

    float noise = sin(v_uv.x * 5.0 + plane.time) * sin(v_uv.y * 5.0 + plane.time * 0.8);
    noise = (noise + 1.0) / 2.0;

    float near_mouse = 1.0 - smoothstep(0.0, 0.5, dist_to_mouse);
    float mouse_influence = near_mouse * 0.3;
    vec3 color = mix(
        plane.color_a.rgb,
        plane.color_b.rgb,
        noise * v_uv.y + sin(plane.time * 0.2) * 0.2 + mouse_influence
    );

    color += sin(plane.time * 0.5) * 0.05;
    color += vec3(0.0, 0.1, 0.2) * near_mouse;

    outColor = vec4(color * plane.opacity, plane.opacity);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate(source: &str, stage: ShaderStage) {
        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("failed to parse {stage:?} shader: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|err| panic!("invalid {stage:?} shader: {err:?}"));
    }

    #[test]
    fn backdrop_shaders_validate() {
        validate(BACKDROP_VERTEX_GLSL, ShaderStage::Vertex);
        validate(BACKDROP_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn wave_shaders_validate() {
        validate(WAVE_VERTEX_GLSL, ShaderStage::Vertex);
        validate(WAVE_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn wave_stages_share_plane_block() {
        let block = |source: &str| {
            let start = source.find("uniform PlaneParams").expect("plane block");
            let end = source[start..].find("} plane;").expect("block end") + start;
            source[start..end].to_string()
        };
        assert_eq!(block(WAVE_VERTEX_GLSL), block(WAVE_FRAGMENT_GLSL));
    }
}
