/// First of the four attribute slots holding the per-instance matrix
pub const INSTANCE_MATRIX_LOCATION: u32 = 2;

/// Foliage vertex shader: morphs every point between its two baked targets
pub const FOLIAGE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_scatter;
layout(location = 2) in vec3 a_tree;
layout(location = 3) in float a_random;
layout(location = 4) in float a_size;

uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_time;
uniform float u_progress;
uniform int u_easing;
uniform float u_noise;
uniform float u_size_attenuation;

out float v_alpha;

float ease(float t) {
    t = clamp(t, 0.0, 1.0);
    if (u_easing == 0) {
        return t;
    }
    if (u_easing == 1) {
        return t < 0.5 ? 2.0 * t * t : 1.0 - pow(-2.0 * t + 2.0, 2.0) / 2.0;
    }
    return t < 0.5 ? 4.0 * t * t * t : 1.0 - pow(-2.0 * t + 2.0, 3.0) / 2.0;
}

void main() {
    float t = ease(u_progress);

    vec3 noise = vec3(
        sin(u_time * 2.0 + a_random * 10.0),
        cos(u_time * 1.5 + a_random * 20.0),
        sin(u_time * 1.8 + a_random * 5.0)
    ) * u_noise;

    // Assembled points barely move
    float movement = mix(1.0, 0.1, t);
    vec3 pos = mix(a_scatter, a_tree, t) + noise * movement;

    vec4 view_pos = u_model_view * vec4(pos, 1.0);
    gl_Position = u_projection * view_pos;

    float depth = -view_pos.z;
    gl_PointSize = depth > 0.0 ? a_size * (u_size_attenuation / depth) : 0.0;

    v_alpha = 0.6 + 0.4 * sin(u_time + a_random * 10.0);
}
"#;

/// Foliage fragment shader: round soft sprite shading from base to tip colour
pub const FOLIAGE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in float v_alpha;

uniform vec3 u_color_base;
uniform vec3 u_color_tip;

out vec4 fragColor;

void main() {
    float dist = length(gl_PointCoord - vec2(0.5));
    if (dist > 0.5) {
        discard;
    }

    float strength = pow(1.0 - dist * 2.0, 1.5);
    vec3 color = mix(u_color_base, u_color_tip, strength * 0.5);

    fragColor = vec4(color, strength * v_alpha);
}
"#;

/// Star backdrop vertex shader
pub const STAR_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in float a_size;
layout(location = 2) in float a_alpha;
layout(location = 3) in vec3 a_color;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_time;

out float v_alpha;
out vec3 v_color;

void main() {
    float twinkle = sin(u_time * 0.8 + a_position.x * 13.0 + a_position.z * 7.0) * 0.25 + 0.75;
    v_alpha = a_alpha * twinkle;
    v_color = a_color;

    vec4 view_pos = u_view * vec4(a_position, 1.0);
    gl_Position = u_projection * view_pos;
    gl_PointSize = max(a_size * (30.0 / -view_pos.z), 1.0);
}
"#;

pub const STAR_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in float v_alpha;
in vec3 v_color;

out vec4 fragColor;

void main() {
    vec2 coord = gl_PointCoord - vec2(0.5);
    float dist = length(coord);
    if (dist > 0.5) {
        discard;
    }

    float alpha = v_alpha * (1.0 - dist * 2.0);
    fragColor = vec4(v_color, alpha * alpha);
}
"#;

/// Instanced ornament vertex shader; the instance matrix spans locations 2..=5
pub const ORNAMENT_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in mat4 a_instance;

uniform mat4 u_group;
uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_position;
out vec3 v_normal;

void main() {
    mat4 model = u_group * a_instance;
    vec4 world_pos = model * vec4(a_position, 1.0);

    v_world_position = world_pos.xyz;
    v_normal = mat3(model) * a_normal;

    gl_Position = u_projection * u_view * world_pos;
}
"#;

/// Metal/rough ornament shading with an ambient, spot, rim and core light.
///
/// Unlit layers output their flat colour and skip tone mapping so they stay
/// bright enough to feed the bloom.
pub const ORNAMENT_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;

uniform vec3 u_color;
uniform float u_metalness;
uniform float u_roughness;
uniform int u_lit;
uniform int u_tone_mapped;
uniform float u_exposure;
uniform vec3 u_camera_pos;

uniform vec3 u_ambient_color;
uniform vec3 u_key_position;
uniform vec3 u_key_color;
uniform vec3 u_fill_position;
uniform vec3 u_fill_color;
uniform vec3 u_core_position;
uniform vec3 u_core_color;
uniform float u_core_range;

out vec4 fragColor;

vec3 aces(vec3 x) {
    x *= u_exposure;
    return clamp((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14), 0.0, 1.0);
}

vec3 shade(vec3 light_color, vec3 light_dir, vec3 normal, vec3 view_dir) {
    float ndotl = max(dot(normal, light_dir), 0.0);
    vec3 half_dir = normalize(light_dir + view_dir);
    float shininess = mix(256.0, 4.0, u_roughness);
    float spec = pow(max(dot(normal, half_dir), 0.0), shininess);

    vec3 diffuse = u_color * (1.0 - u_metalness) * ndotl;
    vec3 spec_tint = mix(vec3(0.04), u_color, u_metalness);
    vec3 specular = spec_tint * spec * (1.0 - u_roughness * 0.7);

    return (diffuse + specular) * light_color;
}

void main() {
    vec3 color;

    if (u_lit == 0) {
        color = u_color;
    } else {
        vec3 normal = normalize(v_normal);
        vec3 view_dir = normalize(u_camera_pos - v_world_position);

        color = u_ambient_color * u_color;
        color += shade(u_key_color, normalize(u_key_position - v_world_position), normal, view_dir);
        color += shade(u_fill_color, normalize(u_fill_position - v_world_position), normal, view_dir);

        vec3 to_core = u_core_position - v_world_position;
        float falloff = clamp(1.0 - length(to_core) / u_core_range, 0.0, 1.0);
        color += shade(u_core_color, normalize(to_core), normal, view_dir) * falloff * falloff;

        // Cheap environment reflection for polished metal
        float fresnel = pow(1.0 - max(dot(normal, view_dir), 0.0), 5.0);
        color += u_color * u_metalness * (0.15 + fresnel) * (1.0 - u_roughness);
    }

    if (u_tone_mapped != 0) {
        color = aces(color);
    }

    fragColor = vec4(color, 1.0);
}
"#;

/// Fullscreen triangle generated from gl_VertexID
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

out vec2 v_uv;

void main() {
    float x = float((gl_VertexID & 1) << 2);
    float y = float((gl_VertexID & 2) << 1);
    v_uv = vec2(x * 0.5, y * 0.5);
    gl_Position = vec4(x - 1.0, y - 1.0, 0.0, 1.0);
}
"#;

pub const BLOOM_EXTRACT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform float u_threshold;

out vec4 fragColor;

void main() {
    vec3 color = texture(u_texture, v_uv).rgb;
    float luma = dot(color, vec3(0.2126, 0.7152, 0.0722));
    float weight = smoothstep(u_threshold, u_threshold + 0.1, luma);
    fragColor = vec4(color * weight, 1.0);
}
"#;

/// Separable 9-tap Gaussian; `u_direction` picks the axis
pub const BLUR_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform vec2 u_direction;

out vec4 fragColor;

void main() {
    vec2 texel = 1.0 / vec2(textureSize(u_texture, 0));
    float weights[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    vec3 result = texture(u_texture, v_uv).rgb * weights[0];
    for (int i = 1; i < 5; i++) {
        vec2 offset = u_direction * texel * float(i) * 2.0;
        result += texture(u_texture, v_uv + offset).rgb * weights[i];
        result += texture(u_texture, v_uv - offset).rgb * weights[i];
    }

    fragColor = vec4(result, 1.0);
}
"#;

/// Bloom add, vignette and film grain
pub const COMPOSITE_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_scene;
uniform sampler2D u_bloom;
uniform float u_bloom_strength;
uniform float u_vignette_offset;
uniform float u_vignette_darkness;
uniform float u_grain;
uniform float u_time;

out vec4 fragColor;

float hash(vec2 p) {
    vec3 p3 = fract(vec3(p.xyx) * 0.1031);
    p3 += dot(p3, p3.yzx + 33.33);
    return fract((p3.x + p3.y) * p3.z);
}

void main() {
    vec3 color = texture(u_scene, v_uv).rgb;
    color += texture(u_bloom, v_uv).rgb * u_bloom_strength;

    float d = distance(v_uv, vec2(0.5));
    color *= smoothstep(0.8, u_vignette_offset * 0.799, d * (u_vignette_darkness + u_vignette_offset));

    float grain = hash(gl_FragCoord.xy + fract(u_time) * 1000.0) - 0.5;
    color += grain * u_grain;

    fragColor = vec4(clamp(color, 0.0, 1.0), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&str; 10] = [
        FOLIAGE_VERTEX_SHADER,
        FOLIAGE_FRAGMENT_SHADER,
        STAR_VERTEX_SHADER,
        STAR_FRAGMENT_SHADER,
        ORNAMENT_VERTEX_SHADER,
        ORNAMENT_FRAGMENT_SHADER,
        FULLSCREEN_VERTEX_SHADER,
        BLOOM_EXTRACT_SHADER,
        BLUR_SHADER,
        COMPOSITE_SHADER,
    ];

    #[test]
    fn test_shader_version() {
        for src in ALL {
            assert!(src.starts_with("#version 300 es"));
            assert!(src.contains("precision highp float;"));
        }
    }

    #[test]
    fn test_instance_matrix_slot() {
        let decl = format!("layout(location = {}) in mat4 a_instance;", INSTANCE_MATRIX_LOCATION);
        assert!(ORNAMENT_VERTEX_SHADER.contains(&decl));
    }

    #[test]
    fn test_foliage_easing_ids() {
        use crate::animation::Easing;
        for easing in [Easing::Linear, Easing::EaseInOutQuad] {
            let branch = format!("u_easing == {}", easing.shader_id());
            assert!(FOLIAGE_VERTEX_SHADER.contains(&branch));
        }
        // Cubic is the fallthrough
        assert_eq!(Easing::EaseInOutCubic.shader_id(), 2);
    }

    #[test]
    fn test_foliage_discards_outside_disc() {
        assert!(FOLIAGE_FRAGMENT_SHADER.contains("if (dist > 0.5)"));
        assert!(FOLIAGE_FRAGMENT_SHADER.contains("discard;"));
    }
}
