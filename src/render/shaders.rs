/// Entry point of the vertex stage used for floors and walls.
pub const PLAIN_VERTEX_ENTRY: &str = "vs_plain";
/// Entry point of the vertex stage that overrides depth with `final_z`.
pub const LIT_VERTEX_ENTRY: &str = "vs_lit";
/// Entry point of the shared fragment stage.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL program shared by both level pipelines.
///
/// `vs_lit` forwards `lighted` at location 2; `fs_main` only declares
/// locations 0 and 1, so the flag is never read.
pub const SHADER: &str = r#"
struct DrawUniforms {
    perspective: mat4x4<f32>,
    view: mat4x4<f32>,
    v_light: vec4<f32>,
    light_color: vec4<f32>,
    dark_color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: DrawUniforms;

@group(0) @binding(1)
var tex: texture_2d<f32>;

@group(0) @binding(2)
var tex_sampler: sampler;

struct PlainInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

struct LitInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
    @location(2) normal: vec3<f32>,
    @location(3) lighted: f32,
    @location(4) final_z: f32,
}

struct PlainOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
    @location(1) normal: vec3<f32>,
}

struct LitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) lighted: f32,
}

struct FragmentInput {
    @location(0) tex_coords: vec2<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_plain(input: PlainInput) -> PlainOutput {
    var out: PlainOutput;
    out.tex_coords = input.tex_coords;
    out.normal = input.normal;
    out.clip_position = globals.perspective * globals.view * vec4<f32>(input.position, 1.0);
    return out;
}

@vertex
fn vs_lit(input: LitInput) -> LitOutput {
    var out: LitOutput;
    out.tex_coords = input.tex_coords;
    out.normal = input.normal;
    out.lighted = input.lighted;
    var clip = globals.perspective * globals.view * vec4<f32>(input.position, 1.0);
    clip.z = input.final_z / 1000.0;
    out.clip_position = clip;
    return out;
}

@fragment
fn fs_main(input: FragmentInput) -> @location(0) vec4<f32> {
    let brightness = dot(normalize(input.normal), normalize(globals.v_light.xyz));
    let ramp = mix(globals.dark_color.xyz, globals.light_color.xyz, vec3<f32>(brightness));
    let ratio = vec4<f32>(ramp, 1.0);
    return ratio * textureSample(tex, tex_sampler, input.tex_coords);
}
"#;
