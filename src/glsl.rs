//! GLSL source generation from the shader IR.
//!
//! [`compile`] emits a vertex and a fragment shader in one of three dialects.
//! ES 1.00 uses `attribute` / `varying` / `texture2D` / `gl_FragColor`; ES
//! 3.00 and desktop 1.50 use `in` / `out` / `texture` / `fragColor`. Dialects
//! without an integer `%` get `modInt` helpers instead.

use crate::ir::{self, Block, Constant, Expr, Func, Program, Stmt, Type};

/// The GLSL dialect of generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslVersion {
    /// Desktop GLSL 1.50 (OpenGL 3.2 core).
    Default,
    /// GLSL ES 1.00 (GLES 2, WebGL 1).
    Es100,
    /// GLSL ES 3.00 (GLES 3, WebGL 2).
    Es300,
}

impl GlslVersion {
    fn header(self) -> &'static str {
        match self {
            Self::Default => "#version 150",
            Self::Es100 => "",
            Self::Es300 => "#version 300 es",
        }
    }

    fn has_integer_mod(self) -> bool {
        self == Self::Es300
    }

    fn is_legacy(self) -> bool {
        self == Self::Es100
    }

    /// The fragment output variable.
    #[must_use]
    pub fn frag_color(self) -> &'static str {
        if self.is_legacy() {
            "gl_FragColor"
        } else {
            "fragColor"
        }
    }

    /// The texture sampling function.
    #[must_use]
    pub fn texture_func(self) -> &'static str {
        if self.is_legacy() {
            "texture2D"
        } else {
            "texture"
        }
    }

    fn attribute_keyword(self) -> &'static str {
        if self.is_legacy() {
            "attribute"
        } else {
            "in"
        }
    }

    fn varying_keyword(self, vertex: bool) -> &'static str {
        match (self.is_legacy(), vertex) {
            (true, _) => "varying",
            (false, true) => "out",
            (false, false) => "in",
        }
    }
}

const MOD_INT_FUNCTIONS: &str = "int modInt(int x, int y) {
\treturn x - y*(x/y);
}

ivec2 modInt(ivec2 x, int y) {
\treturn x - y*(x/y);
}

ivec3 modInt(ivec3 x, int y) {
\treturn x - y*(x/y);
}

ivec4 modInt(ivec4 x, int y) {
\treturn x - y*(x/y);
}

ivec2 modInt(ivec2 x, ivec2 y) {
\treturn x - y*(x/y);
}

ivec3 modInt(ivec3 x, ivec3 y) {
\treturn x - y*(x/y);
}

ivec4 modInt(ivec4 x, ivec4 y) {
\treturn x - y*(x/y);
}";

/// The text every generated vertex shader starts with.
#[must_use]
pub fn vertex_prelude(version: GlslVersion) -> String {
    let mut prelude = version.header().to_owned();
    if !version.has_integer_mod() {
        prelude.push_str("\n\n");
        prelude.push_str(MOD_INT_FUNCTIONS);
    }
    prelude
}

/// The text every generated fragment shader starts with.
#[must_use]
pub fn fragment_prelude(version: GlslVersion) -> String {
    let mut prelude = version.header().to_owned();
    prelude.push_str(
        "\n\n#if defined(GL_ES)
precision highp float;
precision highp int;
#else
#define lowp
#define mediump
#define highp
#endif",
    );
    if !version.is_legacy() {
        prelude.push_str("\n\nout vec4 fragColor;");
    }
    if !version.has_integer_mod() {
        prelude.push_str("\n\n");
        prelude.push_str(MOD_INT_FUNCTIONS);
    }
    prelude
}

/// Which body is being emitted; decides how local indices are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Vertex,
    Fragment,
    Func,
}

struct Compiler<'a> {
    program: &'a Program,
    version: GlslVersion,
    struct_types: Vec<Type>,
}

/// Translates `program` into `(vertex_source, fragment_source)`.
///
/// Malformed IR (an invalid swizzle, a zero loop step, an operator in the
/// wrong position) is emitted as a `?(...)` marker so that the driver
/// rejects the source with a compile error.
#[must_use]
pub fn compile(program: &Program, version: GlslVersion) -> (String, String) {
    let program = redirect_fragment_entry(program);
    let mut c = Compiler {
        program: &program,
        version,
        struct_types: Vec::new(),
    };

    let vertex_body = c.vertex_body();
    let fragment_body = c.fragment_body();
    let structs = c.struct_declarations();

    let vs = assemble(&vertex_prelude(version), &structs, &vertex_body);
    let fs = assemble(&fragment_prelude(version), &structs, &fragment_body);
    (vs, fs)
}

fn assemble(prelude: &str, structs: &[String], body: &[String]) -> String {
    let mut lines: Vec<&str> = prelude.lines().collect();
    lines.push("");
    lines.extend(structs.iter().map(String::as_str));
    lines.push("");
    lines.extend(body.iter().map(String::as_str));

    let mut out = String::new();
    let mut blank = false;
    for line in lines {
        if line.is_empty() {
            blank = true;
            continue;
        }
        if blank && !out.is_empty() {
            out.push('\n');
        }
        blank = false;
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Moves the fragment body into a helper returning `vec4`, and makes the
/// entry point a single call to it whose result is the output color.
fn redirect_fragment_entry(program: &Program) -> Program {
    let mut program = program.clone();
    let Some(body) = program.fragment_func.take() else {
        return program;
    };

    let index = program
        .funcs
        .iter()
        .map(|f| f.index + 1)
        .max()
        .unwrap_or(0);
    let input_count = 1 + program.varyings.len();

    let mut in_params = Vec::with_capacity(input_count);
    in_params.push(Type::Vec4);
    in_params.extend(program.varyings.iter().cloned());

    program.funcs.push(Func {
        index,
        in_params,
        out_params: Vec::new(),
        ret: Type::Vec4,
        block: body,
    });

    let args = (0..input_count).map(Expr::Local).collect();
    program.fragment_func = Some(Block {
        local_vars: Vec::new(),
        local_var_index_offset: input_count,
        stmts: vec![Stmt::Return(Some(Expr::Call(
            Box::new(Expr::Function(index)),
            args,
        )))],
    });
    program
}

fn basic_type_name(t: &Type) -> &'static str {
    match t {
        Type::None => "void",
        Type::Bool => "bool",
        Type::Int => "int",
        Type::Float => "float",
        Type::Vec2 => "vec2",
        Type::Vec3 => "vec3",
        Type::Vec4 => "vec4",
        Type::IVec2 => "ivec2",
        Type::IVec3 => "ivec3",
        Type::IVec4 => "ivec4",
        Type::Mat2 => "mat2",
        Type::Mat3 => "mat3",
        Type::Mat4 => "mat4",
        Type::Array(..) | Type::Struct(_) => "?(unexpected type)",
    }
}

fn number_literal(value: Constant) -> String {
    match value {
        Constant::Bool(b) => b.to_string(),
        Constant::Int(i) => i.to_string(),
        Constant::Float(x) if x.is_finite() && x.fract() == 0.0 => format!("{x:.1}"),
        Constant::Float(x) => format!("{x:.10e}"),
    }
}

fn indent(level: usize) -> String {
    "\t".repeat(level + 1)
}

impl Compiler<'_> {
    fn struct_name(&mut self, t: &Type) -> String {
        let index = match self.struct_types.iter().position(|s| s == t) {
            Some(index) => index,
            None => {
                self.struct_types.push(t.clone());
                self.struct_types.len() - 1
            }
        };
        format!("S{index}")
    }

    fn struct_declarations(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        // Member declarations may register nested structs; iterate by index.
        let mut i = 0;
        while i < self.struct_types.len() {
            let Type::Struct(members) = self.struct_types[i].clone() else {
                i += 1;
                continue;
            };
            lines.push(format!("struct S{i} {{"));
            for (j, member) in members.iter().enumerate() {
                let decl = self.var_decl(member, &format!("M{j}"));
                lines.push(format!("\t{decl};"));
            }
            lines.push("};".to_owned());
            i += 1;
        }
        lines
    }

    fn type_string(&mut self, t: &Type) -> (String, String) {
        match t {
            Type::Struct(_) => (self.struct_name(t), String::new()),
            Type::Array(element, len) => {
                let (t0, _) = self.type_string(element);
                (t0, format!("[{len}]"))
            }
            _ => (basic_type_name(t).to_owned(), String::new()),
        }
    }

    fn var_decl(&mut self, t: &Type, name: &str) -> String {
        let (t0, t1) = self.type_string(t);
        format!("{t0} {name}{t1}")
    }

    fn var_init(&mut self, t: &Type) -> String {
        match t {
            Type::None => "?(none)".to_owned(),
            Type::Bool => "false".to_owned(),
            Type::Int => "0".to_owned(),
            Type::Array(element, len) => {
                let init = self.var_init(element);
                let (t0, t1) = self.type_string(t);
                let elements = vec![init; *len].join(", ");
                format!("{t0}{t1}({elements})")
            }
            Type::Struct(members) => {
                let name = self.struct_name(t);
                let inits: Vec<String> = members.iter().map(|m| self.var_init(m)).collect();
                format!("{name}({})", inits.join(", "))
            }
            _ => format!("{}(0)", basic_type_name(t)),
        }
    }

    fn declarations(&mut self, vertex: bool) -> Vec<String> {
        let program = self.program;
        let mut lines = Vec::new();
        for (i, t) in program.uniforms.iter().enumerate() {
            let decl = self.var_decl(t, &format!("U{i}"));
            lines.push(format!("uniform {decl};"));
        }
        for i in 0..program.texture_count {
            lines.push(format!("uniform sampler2D T{i};"));
        }
        if vertex {
            for (i, t) in program.attributes.iter().enumerate() {
                let decl = self.var_decl(t, &format!("A{i}"));
                lines.push(format!("{} {decl};", self.version.attribute_keyword()));
            }
        }
        let keyword = self.version.varying_keyword(vertex);
        for (i, t) in program.varyings.iter().enumerate() {
            let decl = self.var_decl(t, &format!("V{i}"));
            lines.push(format!("{keyword} {decl};"));
        }
        lines
    }

    fn functions(&mut self, entry: Option<&Block>) -> Vec<String> {
        let program = self.program;
        let funcs: Vec<&Func> = match entry {
            Some(block) => program
                .reachable_funcs(block)
                .into_iter()
                .filter_map(|index| program.funcs.iter().find(|f| f.index == index))
                .collect(),
            None => program.funcs.iter().collect(),
        };

        let mut lines = Vec::new();
        if funcs.is_empty() {
            return lines;
        }
        lines.push(String::new());
        for f in &funcs {
            let sig = self.signature(f);
            lines.push(format!("{sig};"));
        }
        for f in &funcs {
            lines.push(String::new());
            let sig = self.signature(f);
            lines.push(format!("{sig} {{"));
            let mut locals = f.in_params.clone();
            locals.extend(f.out_params.iter().cloned());
            lines.extend(self.block(Scope::Func, &f.block, &mut locals, 0));
            lines.push("}".to_owned());
        }
        lines
    }

    fn signature(&mut self, f: &Func) -> String {
        let mut args = Vec::new();
        for (i, t) in f.in_params.iter().enumerate() {
            args.push(format!("in {}", self.var_decl(t, &format!("l{i}"))));
        }
        for (i, t) in f.out_params.iter().enumerate() {
            let index = f.in_params.len() + i;
            args.push(format!("out {}", self.var_decl(t, &format!("l{index}"))));
        }
        let args = if args.is_empty() {
            "void".to_owned()
        } else {
            args.join(", ")
        };
        let (t0, t1) = self.type_string(&f.ret);
        format!("{t0}{t1} F{}({args})", f.index)
    }

    fn vertex_body(&mut self) -> Vec<String> {
        let program = self.program;
        let mut lines = self.declarations(true);
        lines.extend(self.functions(program.vertex_func.as_ref()));

        // Touch the last element of every uniform array; some drivers leave
        // the leading elements uninitialized otherwise.
        let touched: Vec<String> = program
            .uniforms
            .iter()
            .enumerate()
            .filter_map(|(i, t)| match t {
                Type::Array(element, len) if *len > 1 => {
                    let suffix = match **element {
                        Type::Vec2
                        | Type::Vec3
                        | Type::Vec4
                        | Type::IVec2
                        | Type::IVec3
                        | Type::IVec4 => ".x",
                        Type::Mat2 | Type::Mat3 | Type::Mat4 => "[0][0]",
                        _ => "",
                    };
                    Some(format!("float(U{i}[{}]{suffix})", len - 1))
                }
                _ => None,
            })
            .collect();

        let Some(entry) = program.vertex_func.as_ref().filter(|b| !b.stmts.is_empty()) else {
            return lines;
        };
        if !touched.is_empty() {
            lines.push(String::new());
            lines.push("float touchUniforms() {".to_owned());
            lines.push(format!("\treturn {};", touched.join(" + ")));
            lines.push("}".to_owned());
        }
        lines.push(String::new());
        lines.push("void main(void) {".to_owned());
        if !touched.is_empty() {
            lines.push("\ttouchUniforms();".to_owned());
        }
        let mut locals = program.attributes.clone();
        locals.push(Type::Vec4);
        locals.extend(program.varyings.iter().cloned());
        lines.extend(self.block(Scope::Vertex, entry, &mut locals, 0));
        lines.push("}".to_owned());
        lines
    }

    fn fragment_body(&mut self) -> Vec<String> {
        let program = self.program;
        let mut lines = self.declarations(false);
        lines.extend(self.functions(program.fragment_func.as_ref()));

        let Some(entry) = program.fragment_func.as_ref().filter(|b| !b.stmts.is_empty()) else {
            return lines;
        };
        lines.push(String::new());
        lines.push("void main(void) {".to_owned());
        let mut locals = vec![Type::Vec4];
        locals.extend(program.varyings.iter().cloned());
        lines.extend(self.block(Scope::Fragment, entry, &mut locals, 0));
        lines.push("}".to_owned());
        lines
    }

    fn local_name(&self, scope: Scope, index: usize) -> String {
        let na = self.program.attributes.len();
        let nv = self.program.varyings.len();
        match scope {
            Scope::Vertex => match index {
                i if i < na => format!("A{i}"),
                i if i == na => "gl_Position".to_owned(),
                i if i < na + nv + 1 => format!("V{}", i - na - 1),
                i => format!("l{}", i - (na + nv + 1)),
            },
            Scope::Fragment => match index {
                0 => "gl_FragCoord".to_owned(),
                i if i < nv + 1 => format!("V{}", i - 1),
                i => format!("l{}", i - (nv + 1)),
            },
            Scope::Func => format!("l{index}"),
        }
    }

    fn init_variable(
        &mut self,
        scope: Scope,
        locals: &[Type],
        index: usize,
        decl: bool,
        level: usize,
    ) -> Vec<String> {
        let idt = indent(level);
        let name = self.local_name(scope, index);
        let t = locals.get(index).cloned().unwrap_or(Type::None);

        match &t {
            // Loop counters carry no type here; the loop header declares them.
            Type::None => Vec::new(),
            Type::Array(element, len) => {
                let mut lines = Vec::new();
                if decl {
                    lines.push(format!("{idt}{};", self.var_decl(&t, &name)));
                }
                let init = self.var_init(element);
                for i in 0..*len {
                    lines.push(format!("{idt}{name}[{i}] = {init};"));
                }
                lines
            }
            _ => {
                let init = self.var_init(&t);
                if decl {
                    vec![format!("{idt}{} = {init};", self.var_decl(&t, &name))]
                } else {
                    vec![format!("{idt}{name} = {init};")]
                }
            }
        }
    }

    fn block(
        &mut self,
        scope: Scope,
        block: &Block,
        locals: &mut Vec<Type>,
        level: usize,
    ) -> Vec<String> {
        let offset = block.local_var_index_offset;
        if locals.len() < offset + block.local_vars.len() {
            locals.resize(offset + block.local_vars.len(), Type::None);
        }
        for (i, t) in block.local_vars.iter().enumerate() {
            locals[offset + i] = t.clone();
        }

        let mut lines = Vec::new();
        for i in 0..block.local_vars.len() {
            lines.extend(self.init_variable(scope, locals, offset + i, true, level));
        }

        let idt = indent(level);
        for stmt in &block.stmts {
            match stmt {
                Stmt::Expr(e) => lines.push(format!("{idt}{};", self.expr(scope, e))),
                Stmt::Block(b) => {
                    lines.push(format!("{idt}{{"));
                    lines.extend(self.block(scope, b, locals, level + 1));
                    lines.push(format!("{idt}}}"));
                }
                Stmt::Assign(lhs, rhs) => {
                    let l = self.expr(scope, lhs);
                    let r = self.expr(scope, rhs);
                    if let Expr::Local(index) = lhs {
                        if let Some(Type::Array(_, len)) = locals.get(*index) {
                            for i in 0..*len {
                                lines.push(format!("{idt}{l}[{i}] = {r}[{i}];"));
                            }
                            continue;
                        }
                    }
                    lines.push(format!("{idt}{l} = {r};"));
                }
                Stmt::Init(index) => {
                    lines.extend(self.init_variable(scope, locals, *index, false, level));
                }
                Stmt::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    lines.push(format!("{idt}if ({}) {{", self.expr(scope, cond)));
                    lines.extend(self.block(scope, then, locals, level + 1));
                    if let Some(b) = otherwise {
                        lines.push(format!("{idt}}} else {{"));
                        lines.extend(self.block(scope, b, locals, level + 1));
                    }
                    lines.push(format!("{idt}}}"));
                }
                Stmt::For {
                    var_type,
                    var_index,
                    init,
                    end,
                    op,
                    delta,
                    body,
                } => {
                    let v = self.local_name(scope, *var_index);
                    let step = delta.as_f64();
                    let delta = if step == 0.0 {
                        format!("?(unexpected delta: {step})")
                    } else if step == 1.0 {
                        format!("{v}++")
                    } else if step == -1.0 {
                        format!("{v}--")
                    } else if step > 0.0 {
                        format!("{v} += {}", number_literal(*delta))
                    } else {
                        format!("{v} -= {}", number_literal(delta.neg()))
                    };
                    let op = if op.is_comparison() {
                        op.as_str().to_owned()
                    } else {
                        format!("?(unexpected op: {op:?})")
                    };
                    let (t0, t1) = self.type_string(var_type);
                    lines.push(format!(
                        "{idt}for ({t0} {v}{t1} = {}; {v} {op} {}; {delta}) {{",
                        number_literal(*init),
                        number_literal(*end),
                    ));
                    lines.extend(self.block(scope, body, locals, level + 1));
                    lines.push(format!("{idt}}}"));
                }
                Stmt::Continue => lines.push(format!("{idt}continue;")),
                Stmt::Break => lines.push(format!("{idt}break;")),
                Stmt::Return(value) => match (scope, value) {
                    (Scope::Fragment, Some(e)) => {
                        let out = self.version.frag_color();
                        lines.push(format!("{idt}{out} = {};", self.expr(scope, e)));
                    }
                    (_, None) => lines.push(format!("{idt}return;")),
                    (_, Some(e)) => lines.push(format!("{idt}return {};", self.expr(scope, e))),
                },
                Stmt::Discard => {
                    // Only reachable inside the redirected fragment body.
                    lines.push(format!("{idt}discard;"));
                    lines.push(format!("{idt}return vec4(0.0);"));
                }
            }
        }
        lines
    }

    fn expr(&self, scope: Scope, e: &Expr) -> String {
        match e {
            Expr::Number(value) => number_literal(*value),
            Expr::Uniform(i) => format!("U{i}"),
            Expr::Texture(i) => format!("T{i}"),
            Expr::Local(i) => self.local_name(scope, *i),
            Expr::StructMember(i) => format!("M{i}"),
            Expr::Builtin(f) => f
                .common_name()
                .unwrap_or_else(|| self.version.texture_func())
                .to_owned(),
            Expr::Swizzle(s) if ir::is_valid_swizzle(s) => s.clone(),
            Expr::Swizzle(s) => format!("?(unexpected swizzling: {s})"),
            Expr::Function(i) => format!("F{i}"),
            Expr::Unary(op, operand) => {
                let op = match op {
                    ir::Op::Add | ir::Op::Sub | ir::Op::Not => op.as_str().to_owned(),
                    _ => format!("?(unexpected op: {op:?})"),
                };
                format!("{op}({})", self.expr(scope, operand))
            }
            Expr::Binary(ir::Op::Mod, lhs, rhs) if !self.version.has_integer_mod() => format!(
                "modInt(({}), ({}))",
                self.expr(scope, lhs),
                self.expr(scope, rhs)
            ),
            Expr::Binary(op, lhs, rhs) => format!(
                "({}) {} ({})",
                self.expr(scope, lhs),
                op.as_str(),
                self.expr(scope, rhs)
            ),
            Expr::Selection(cond, a, b) => format!(
                "({}) ? ({}) : ({})",
                self.expr(scope, cond),
                self.expr(scope, a),
                self.expr(scope, b)
            ),
            Expr::Call(callee, args) => {
                let args: Vec<String> = args.iter().map(|a| self.expr(scope, a)).collect();
                format!("{}({})", self.expr(scope, callee), args.join(", "))
            }
            Expr::FieldSelector(value, field) => {
                format!("({}).{}", self.expr(scope, value), self.expr(scope, field))
            }
            Expr::Index(value, index) => {
                format!("({})[{}]", self.expr(scope, value), self.expr(scope, index))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BuiltinFunc, Op};

    /// `gl_Position = vec4(A0, 0, 1); V0 = A1;` / `return texture(T0, V0);`
    fn textured_program() -> Program {
        let vertex = Block {
            local_vars: vec![],
            local_var_index_offset: 4,
            stmts: vec![
                Stmt::Assign(
                    Expr::Local(2),
                    Expr::Call(
                        Box::new(Expr::Builtin(BuiltinFunc::Vec4)),
                        vec![
                            Expr::Local(0),
                            Expr::Number(Constant::Float(0.0)),
                            Expr::Number(Constant::Float(1.0)),
                        ],
                    ),
                ),
                Stmt::Assign(Expr::Local(3), Expr::Local(1)),
            ],
        };
        let fragment = Block {
            local_vars: vec![],
            local_var_index_offset: 2,
            stmts: vec![Stmt::Return(Some(Expr::Call(
                Box::new(Expr::Builtin(BuiltinFunc::TexelAt)),
                vec![Expr::Texture(0), Expr::Local(1)],
            )))],
        };
        Program {
            uniforms: vec![Type::Vec2],
            texture_count: 1,
            attributes: vec![Type::Vec2, Type::Vec2],
            varyings: vec![Type::Vec2],
            funcs: vec![],
            vertex_func: Some(vertex),
            fragment_func: Some(fragment),
        }
    }

    #[test]
    fn desktop_dialect() {
        let (vs, fs) = compile(&textured_program(), GlslVersion::Default);
        assert!(vs.starts_with("#version 150\n"));
        assert!(vs.contains("uniform vec2 U0;"));
        assert!(vs.contains("in vec2 A0;"));
        assert!(vs.contains("out vec2 V0;"));
        assert!(vs.contains("\tgl_Position = vec4(A0, 0.0, 1.0);"));
        assert!(vs.contains("\tV0 = A1;"));
        assert!(vs.contains("int modInt(int x, int y)"));

        assert!(fs.contains("out vec4 fragColor;"));
        assert!(fs.contains("uniform sampler2D T0;"));
        assert!(fs.contains("in vec2 V0;"));
        assert!(fs.contains("vec4 F0(in vec4 l0, in vec2 l1);"));
        assert!(fs.contains("\treturn texture(T0, l1);"));
        assert!(fs.contains("\tfragColor = F0(gl_FragCoord, V0);"));
    }

    #[test]
    fn es100_dialect() {
        let (vs, fs) = compile(&textured_program(), GlslVersion::Es100);
        assert!(!vs.contains("#version"));
        assert!(vs.contains("attribute vec2 A0;"));
        assert!(vs.contains("varying vec2 V0;"));
        assert!(fs.contains("varying vec2 V0;"));
        assert!(fs.contains("texture2D(T0, l1)"));
        assert!(fs.contains("gl_FragColor = F0(gl_FragCoord, V0);"));
        assert!(!fs.contains("out vec4 fragColor;"));
        assert!(fs.contains("precision highp float;"));
    }

    #[test]
    fn es300_dialect_has_integer_mod() {
        let mut program = textured_program();
        if let Some(vertex) = program.vertex_func.as_mut() {
            vertex.local_vars.push(Type::Int);
            vertex.stmts.push(Stmt::Assign(
                Expr::Local(4),
                Expr::Binary(
                    Op::Mod,
                    Box::new(Expr::Number(Constant::Int(7))),
                    Box::new(Expr::Number(Constant::Int(3))),
                ),
            ));
        }
        let (vs, _) = compile(&program, GlslVersion::Es300);
        assert!(vs.starts_with("#version 300 es\n"));
        assert!(!vs.contains("modInt"));
        assert!(vs.contains("\tint l0 = 0;"));
        assert!(vs.contains("\tl0 = (7) % (3);"));

        let (vs, _) = compile(&program, GlslVersion::Default);
        assert!(vs.contains("\tl0 = modInt((7), (3));"));
    }

    #[test]
    fn uniform_arrays_are_touched() {
        let mut program = textured_program();
        program.uniforms.push(Type::Array(Box::new(Type::Vec2), 4));
        program.uniforms.push(Type::Array(Box::new(Type::Float), 2));
        let (vs, _) = compile(&program, GlslVersion::Default);
        assert!(vs.contains("uniform vec2 U1[4];"));
        assert!(vs.contains("\treturn float(U1[3].x) + float(U2[1]);"));
        assert!(vs.contains("void main(void) {\n\ttouchUniforms();"));
    }

    #[test]
    fn structs_and_loops() {
        let st = Type::Struct(vec![Type::Float, Type::Vec2]);
        let mut program = textured_program();
        program.funcs.push(Func {
            index: 0,
            in_params: vec![Type::Float],
            out_params: vec![],
            ret: Type::Float,
            block: Block {
                local_vars: vec![st.clone(), Type::None],
                local_var_index_offset: 1,
                stmts: vec![
                    Stmt::For {
                        var_type: Type::Int,
                        var_index: 2,
                        init: Constant::Int(0),
                        end: Constant::Int(4),
                        op: Op::LessThan,
                        delta: Constant::Int(1),
                        body: Block {
                            local_vars: vec![],
                            local_var_index_offset: 3,
                            stmts: vec![Stmt::Continue],
                        },
                    },
                    Stmt::Return(Some(Expr::FieldSelector(
                        Box::new(Expr::Local(1)),
                        Box::new(Expr::StructMember(0)),
                    ))),
                ],
            },
        });
        if let Some(vertex) = program.vertex_func.as_mut() {
            vertex.stmts.push(Stmt::Expr(Expr::Call(
                Box::new(Expr::Function(0)),
                vec![Expr::Number(Constant::Float(0.5))],
            )));
        }
        let (vs, _) = compile(&program, GlslVersion::Default);
        assert!(vs.contains("struct S0 {\n\tfloat M0;\n\tvec2 M1;\n};"));
        assert!(vs.contains("\tS0 l1 = S0(float(0), vec2(0));"));
        assert!(vs.contains("\tfor (int l2 = 0; l2 < 4; l2++) {\n\t\tcontinue;\n\t}"));
        assert!(vs.contains("\treturn (l1).M0;"));
        assert!(vs.contains("\tF0(5.0000000000e-1);"));
    }

    #[test]
    fn discard_returns_from_the_redirected_body() {
        let mut program = textured_program();
        if let Some(fragment) = program.fragment_func.as_mut() {
            fragment.stmts.insert(0, Stmt::Discard);
        }
        let (_, fs) = compile(&program, GlslVersion::Es300);
        assert!(fs.contains("\tdiscard;\n\treturn vec4(0.0);"));
    }

    #[test]
    fn invalid_swizzle_is_marked() {
        let mut program = textured_program();
        if let Some(vertex) = program.vertex_func.as_mut() {
            vertex.stmts.push(Stmt::Assign(
                Expr::Local(3),
                Expr::FieldSelector(
                    Box::new(Expr::Local(1)),
                    Box::new(Expr::Swizzle("xq".to_owned())),
                ),
            ));
        }
        let (vs, _) = compile(&program, GlslVersion::Default);
        assert!(vs.contains("?(unexpected swizzling: xq)"));
    }

    #[test]
    fn number_literals() {
        assert_eq!(number_literal(Constant::Float(2.0)), "2.0");
        assert_eq!(number_literal(Constant::Float(-3.0)), "-3.0");
        assert_eq!(number_literal(Constant::Float(0.25)), "2.5000000000e-1");
        assert_eq!(number_literal(Constant::Int(-4)), "-4");
        assert_eq!(number_literal(Constant::Bool(true)), "true");
    }
}
