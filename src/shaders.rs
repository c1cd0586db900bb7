//! Built-in shader sources and the compile / link helper shared with user
//! shaders.
//!
//! The built-in set is one vertex shader and one fragment template. The
//! template is expanded per [`ProgramKey`] by prepending `#define`s, and the
//! dialect differences (`attribute` vs `in`, `texture2D` vs `texture`,
//! `gl_FragColor` vs `fragColor`) are substituted as text.

use log::debug;

use crate::context::{Context, Program, Shader, ShaderKind};
use crate::error::{Error, ResourceKind, Result};
use crate::glsl::{self, GlslVersion};
use crate::program::ATTRIBUTE_NAMES;
use crate::types::{Address, Filter};

/// Identifiers some GLSL dialects reserve. Built-in sources must avoid them.
const RESERVED_KEYWORDS: &[&str] = &[
    "common",
    "partition",
    "active",
    "asm",
    "class",
    "union",
    "enum",
    "typedef",
    "template",
    "this",
    "resource",
    "goto",
    "inline",
    "noinline",
    "public",
    "static",
    "extern",
    "external",
    "interface",
    "long",
    "short",
    "half",
    "fixed",
    "unsigned",
    "superp",
    "input",
    "output",
    "hvec2",
    "hvec3",
    "hvec4",
    "fvec2",
    "fvec3",
    "fvec4",
    "filter",
    "sizeof",
    "cast",
    "namespace",
    "using",
    "sampler3DRect",
];

const VERTEX_TEMPLATE: &str = "
uniform vec2 viewport_size;
{{attribute}} vec2 A0;
{{attribute}} vec2 A1;
{{attribute}} vec4 A3;
{{varying}} vec2 varying_tex;
{{varying}} vec4 varying_color_scale;

void main(void) {
  varying_tex = A1;
  varying_color_scale = A3;

  mat4 projection_matrix = mat4(
    vec4(2.0 / viewport_size.x, 0, 0, 0),
    vec4(0, 2.0 / viewport_size.y, 0, 0),
    vec4(0, 0, 1, 0),
    vec4(-1, -1, 0, 1)
  );
  gl_Position = projection_matrix * vec4(A0, 0, 1);
}
";

const FRAGMENT_TEMPLATE: &str = "
{{definitions}}

uniform sampler2D T0;
uniform highp vec4 source_region;

#if defined(USE_COLOR_MATRIX)
uniform mat4 color_matrix_body;
uniform vec4 color_matrix_translation;
#endif

#if !defined(FILTER_NEAREST)
uniform highp vec2 source_size;
#endif

#if defined(FILTER_SCREEN)
uniform highp float scale;
#endif

{{varying}} highp vec2 varying_tex;
{{varying}} highp vec4 varying_color_scale;

highp float floorMod(highp float x, highp float y) {
  if (x < 0.0) {
    return y - (-x - y * floor(-x/y));
  }
  return x - y * floor(x/y);
}

highp vec2 adjustTexelByAddress(highp vec2 p, highp vec4 region) {
#if defined(ADDRESS_REPEAT)
  highp vec2 o = region.xy;
  highp vec2 size = region.zw - region.xy;
  return vec2(floorMod((p.x - o.x), size.x) + o.x, floorMod((p.y - o.y), size.y) + o.y);
#else
  return p;
#endif
}

void main(void) {
  highp vec2 pos = varying_tex;

#if defined(FILTER_NEAREST)
  vec4 color;
# if defined(ADDRESS_UNSAFE)
  color = {{texture}}(T0, pos);
# else
  pos = adjustTexelByAddress(pos, source_region);
  if (source_region[0] <= pos.x &&
      source_region[1] <= pos.y &&
      pos.x < source_region[2] &&
      pos.y < source_region[3]) {
    color = {{texture}}(T0, pos);
  } else {
    color = vec4(0, 0, 0, 0);
  }
# endif
#endif

#if defined(FILTER_LINEAR)
  vec4 color;
  highp vec2 texel_size = 1.0 / source_size;

  // Shift by 1/512 texel: positions exactly on the texel grid flicker
  // between neighbours otherwise.
  highp vec2 p0 = pos - (texel_size) / 2.0 + (texel_size / 512.0);
  highp vec2 p1 = pos + (texel_size) / 2.0 + (texel_size / 512.0);

# if !defined(ADDRESS_UNSAFE)
  p0 = adjustTexelByAddress(p0, source_region);
  p1 = adjustTexelByAddress(p1, source_region);
# endif

  vec4 c0 = {{texture}}(T0, p0);
  vec4 c1 = {{texture}}(T0, vec2(p1.x, p0.y));
  vec4 c2 = {{texture}}(T0, vec2(p0.x, p1.y));
  vec4 c3 = {{texture}}(T0, p1);
# if !defined(ADDRESS_UNSAFE)
  if (p0.x < source_region[0]) {
    c0 = vec4(0, 0, 0, 0);
    c2 = vec4(0, 0, 0, 0);
  }
  if (p0.y < source_region[1]) {
    c0 = vec4(0, 0, 0, 0);
    c1 = vec4(0, 0, 0, 0);
  }
  if (source_region[2] <= p1.x) {
    c1 = vec4(0, 0, 0, 0);
    c3 = vec4(0, 0, 0, 0);
  }
  if (source_region[3] <= p1.y) {
    c2 = vec4(0, 0, 0, 0);
    c3 = vec4(0, 0, 0, 0);
  }
# endif

  vec2 rate = fract(p0 * source_size);
  color = mix(mix(c0, c1, rate.x), mix(c2, c3, rate.x), rate.y);
#endif

#if defined(FILTER_SCREEN)
  highp vec2 texel_size = 1.0 / source_size;
  highp vec2 half_scaled_texel_size = texel_size / 2.0 / scale;

  highp vec2 p0 = pos - half_scaled_texel_size + (texel_size / 512.0);
  highp vec2 p1 = pos + half_scaled_texel_size + (texel_size / 512.0);

  vec4 c0 = {{texture}}(T0, p0);
  vec4 c1 = {{texture}}(T0, vec2(p1.x, p0.y));
  vec4 c2 = {{texture}}(T0, vec2(p0.x, p1.y));
  vec4 c3 = {{texture}}(T0, p1);
  // Screen sources always cover the whole region; no edge checks.

  vec2 rate_center = vec2(1.0, 1.0) - half_scaled_texel_size;
  vec2 rate = clamp(((fract(p0 * source_size) - rate_center) * scale) + rate_center, 0.0, 1.0);
  {{frag_color}} = mix(mix(c0, c1, rate.x), mix(c2, c3, rate.x), rate.y);
  // The screen filter never carries a color matrix or color scale.

#else

# if defined(USE_COLOR_MATRIX)
  // Un-premultiply; a zero alpha divides by 1.
  color.rgb /= color.a + (1.0 - sign(color.a));
  color = (color_matrix_body * color) + color_matrix_translation;
  color *= varying_color_scale;
  // Premultiply again.
  color.rgb *= color.a;
# else
  vec4 s = varying_color_scale;
  color *= vec4(s.r, s.g, s.b, 1.0) * s.a;
# endif

  color = min(color, color.a);
  {{frag_color}} = color;

#endif
}
";

/// Selects one variant of the built-in fragment shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ProgramKey {
    pub(crate) use_color_matrix: bool,
    pub(crate) filter: Filter,
    pub(crate) address: Address,
}

impl ProgramKey {
    /// Every variant, 18 in total.
    pub(crate) fn all() -> impl Iterator<Item = Self> {
        [false, true].into_iter().flat_map(|use_color_matrix| {
            Filter::ALL.into_iter().flat_map(move |filter| {
                Address::ALL.into_iter().map(move |address| Self {
                    use_color_matrix,
                    filter,
                    address,
                })
            })
        })
    }

    fn definitions(self) -> String {
        let mut defs = Vec::with_capacity(3);
        if self.use_color_matrix {
            defs.push("#define USE_COLOR_MATRIX");
        }
        defs.push(match self.filter {
            Filter::Nearest => "#define FILTER_NEAREST",
            Filter::Linear => "#define FILTER_LINEAR",
            Filter::Screen => "#define FILTER_SCREEN",
        });
        defs.push(match self.address {
            Address::ClampToZero => "#define ADDRESS_CLAMP_TO_ZERO",
            Address::Repeat => "#define ADDRESS_REPEAT",
            Address::Unsafe => "#define ADDRESS_UNSAFE",
        });
        defs.join("\n")
    }
}

/// Rejects sources using an identifier from the reserved list. Anything
/// after `//` on a line is ignored.
pub(crate) fn check_glsl(source: &str) -> Result<()> {
    let is_start = |c: char| c == '_' || c.is_ascii_alphabetic();
    let is_continue = |c: char| c == '_' || c.is_ascii_alphanumeric();

    for line in source.lines() {
        let mut rest = line.split("//").next().unwrap_or_default();
        while let Some(start) = rest.find(is_start) {
            let tail = &rest[start..];
            let end = tail.find(|c| !is_continue(c)).unwrap_or(tail.len());
            let token = &tail[..end];
            if RESERVED_KEYWORDS.contains(&token) {
                return Err(Error::ReservedKeywordUsed(token.to_owned()));
            }
            rest = &tail[end..];
        }
    }
    Ok(())
}

fn substitute(template: &str, version: GlslVersion, vertex: bool) -> String {
    let (attribute, varying) = match (version, vertex) {
        (GlslVersion::Es100, _) => ("attribute", "varying"),
        (_, true) => ("in", "out"),
        (_, false) => ("in", "in"),
    };
    template
        .replace("{{attribute}}", attribute)
        .replace("{{varying}}", varying)
        .replace("{{texture}}", version.texture_func())
        .replace("{{frag_color}}", version.frag_color())
}

/// The built-in vertex shader in `version`'s dialect.
pub(crate) fn vertex_shader_source(version: GlslVersion) -> Result<String> {
    let source = format!(
        "{}\n{}",
        glsl::vertex_prelude(version),
        substitute(VERTEX_TEMPLATE, version, true)
    );
    check_glsl(&source)?;
    Ok(source)
}

/// The built-in fragment shader for `key` in `version`'s dialect.
pub(crate) fn fragment_shader_source(version: GlslVersion, key: ProgramKey) -> Result<String> {
    let body = FRAGMENT_TEMPLATE.replace("{{definitions}}", &key.definitions());
    let source = format!(
        "{}\n{}",
        glsl::fragment_prelude(version),
        substitute(&body, version, false)
    );
    check_glsl(&source)?;
    Ok(source)
}

/// Compiles and links one built-in variant.
pub(crate) fn builtin_program(
    ctx: &mut dyn Context,
    version: GlslVersion,
    key: ProgramKey,
) -> Result<Program> {
    let vertex = vertex_shader_source(version)?;
    let fragment = fragment_shader_source(version, key)?;
    compile_program(ctx, &vertex, &fragment)
}

/// Compiles both stages, binds `A0..A3` to slots `0..3` and links.
///
/// The shader objects are released whatever the outcome; on success only
/// the program handle remains.
pub(crate) fn compile_program(ctx: &mut dyn Context, vertex: &str, fragment: &str) -> Result<Program> {
    let vs = compile_shader(ctx, ShaderKind::Vertex, vertex)?;
    let fs = match compile_shader(ctx, ShaderKind::Fragment, fragment) {
        Ok(fs) => fs,
        Err(err) => {
            ctx.delete_shader(vs);
            return Err(err);
        }
    };

    let program = link_program(ctx, vs, fs);
    ctx.delete_shader(vs);
    ctx.delete_shader(fs);
    program
}

fn compile_shader(ctx: &mut dyn Context, kind: ShaderKind, source: &str) -> Result<Shader> {
    let shader = ctx.create_shader(kind.gl_enum());
    if shader.is_none() {
        return Err(Error::AllocationFailed(ResourceKind::Shader));
    }
    ctx.shader_source(shader, source);
    ctx.compile_shader(shader);

    if ctx.get_shaderi(shader, glow::COMPILE_STATUS) == 0 {
        let log = ctx.get_shader_info_log(shader);
        ctx.delete_shader(shader);
        return Err(Error::ShaderCompile {
            kind,
            log,
            shader_source: source.to_owned(),
        });
    }
    Ok(shader)
}

fn link_program(ctx: &mut dyn Context, vs: Shader, fs: Shader) -> Result<Program> {
    let program = ctx.create_program();
    if program.is_none() {
        return Err(Error::AllocationFailed(ResourceKind::Program));
    }
    ctx.attach_shader(program, vs);
    ctx.attach_shader(program, fs);
    for (index, name) in (0u32..).zip(ATTRIBUTE_NAMES) {
        ctx.bind_attrib_location(program, index, name);
    }
    ctx.link_program(program);

    if ctx.get_programi(program, glow::LINK_STATUS) == 0 {
        let log = ctx.get_program_info_log(program);
        ctx.delete_program(program);
        return Err(Error::ShaderLink(log));
    }

    ctx.detach_shader(program, vs);
    ctx.detach_shader(program, fs);
    debug!("linked program {}", program.0);
    Ok(program)
}
