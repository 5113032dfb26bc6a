pub(super) const MESH_SHADER_SOURCE: &str = r#"
struct MeshUniforms {
    view_projection: mat4x4<f32>,
    terrain_color: vec4<f32>,
    structure_color: vec4<f32>,
    untextured_color: vec4<f32>,
    light_dir: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: MeshUniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) surface: f32,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) surface: f32,
};

@vertex
fn mesh_vs_main(input: VertexIn) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.view_projection * vec4<f32>(input.position, 1.0);
    out.normal = input.normal;
    out.surface = input.surface;
    return out;
}

@fragment
fn mesh_fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    var base = uniforms.terrain_color.rgb;
    if input.surface > 1.5 {
        base = uniforms.untextured_color.rgb;
    } else if input.surface > 0.5 {
        base = uniforms.structure_color.rgb;
    }
    let n = normalize(input.normal);
    let diffuse = max(dot(n, uniforms.light_dir.xyz), 0.0);
    let shade = 0.55 + 0.45 * diffuse;
    return vec4<f32>(base * shade, 1.0);
}
"#;

pub(super) const MARKER_SHADER_SOURCE: &str = r#"
struct MarkerUniforms {
    view_projection: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: MarkerUniforms;

struct VertexIn {
    @location(0) base_pos: vec2<f32>,
    @location(1) center: vec3<f32>,
    @location(2) radius: f32,
    @location(3) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local_pos: vec2<f32>,
};

@vertex
fn vs_main(input: VertexIn) -> VertexOutput {
    let offset = (uniforms.right.xyz * input.base_pos.x + uniforms.up.xyz * input.base_pos.y) * input.radius;
    var out: VertexOutput;
    out.position = uniforms.view_projection * vec4<f32>(input.center + offset, 1.0);
    out.color = input.color;
    out.local_pos = input.base_pos;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let radius = length(input.local_pos);
    let inner = 1.0 - smoothstep(0.78, 0.9, radius);
    let rim = smoothstep(0.78, 0.9, radius) * (1.0 - smoothstep(0.92, 1.0, radius));
    let color = input.color.rgb * inner + vec3<f32>(0.12, 0.13, 0.15) * rim;
    let alpha = max(inner, rim * 0.9) * input.color.a;
    if alpha < 0.03 {
        discard;
    }
    return vec4<f32>(color, alpha);
}
"#;
