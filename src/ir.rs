//! Shader intermediate representation consumed by
//! [`Graphics::new_shader`](crate::Graphics::new_shader).
//!
//! The IR is produced by an external shader front end. Variables are referred
//! to by index only: uniforms `U#`, textures `T#`, attributes `A#`, varyings
//! `V#`, locals `l#`, functions `F#`. Local indices of the two entry points
//! start with their implicit inputs:
//!
//! - vertex entry: attributes, then `gl_Position`, then varyings, then locals;
//! - fragment entry: `gl_FragCoord`, then varyings, then locals.
//!
//! Function locals start with the in parameters, then the out parameters.

use std::fmt;

/// Number of source textures a draw may bind.
pub const SOURCE_IMAGE_COUNT: usize = 4;

/// Uniform slot: destination framebuffer size `(w, h)`.
pub const DST_TEXTURE_SIZE_UNIFORM: usize = 0;
/// Uniform slot: source texture sizes, one `vec2` per source.
pub const SOURCE_TEXTURE_SIZES_UNIFORM: usize = 1;
/// Uniform slot: destination region origin, normalized.
pub const DST_REGION_ORIGIN_UNIFORM: usize = 2;
/// Uniform slot: destination region size, normalized.
pub const DST_REGION_SIZE_UNIFORM: usize = 3;
/// Uniform slot: per-source sampling offsets for sources `1..`.
pub const SOURCE_OFFSETS_UNIFORM: usize = 4;
/// Uniform slot: source region origin.
pub const SOURCE_REGION_ORIGIN_UNIFORM: usize = 5;
/// Uniform slot: source region size.
pub const SOURCE_REGION_SIZE_UNIFORM: usize = 6;
/// Uniform slot: pixel-to-clip projection, column-major `mat4`.
pub const PROJECTION_MATRIX_UNIFORM: usize = 7;
/// Slots below this index carry engine-defined values.
pub const PRESERVED_UNIFORM_COUNT: usize = 8;

/// The declared types of the preserved uniform slots, in slot order.
#[must_use]
pub fn preserved_uniform_types() -> Vec<Type> {
    vec![
        Type::Vec2,
        Type::Array(Box::new(Type::Vec2), SOURCE_IMAGE_COUNT),
        Type::Vec2,
        Type::Vec2,
        Type::Array(Box::new(Type::Vec2), SOURCE_IMAGE_COUNT - 1),
        Type::Vec2,
        Type::Vec2,
        Type::Mat4,
    ]
}

/// A GLSL-expressible type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Type {
    /// `void`.
    None,
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
    /// A fixed-length array.
    Array(Box<Type>, usize),
    /// An anonymous struct; members are named `M#`.
    Struct(Vec<Type>),
}

impl Type {
    /// Number of 32-bit scalars a value of this type occupies as a uniform.
    #[must_use]
    pub fn float_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Bool | Self::Int | Self::Float => 1,
            Self::Vec2 | Self::IVec2 => 2,
            Self::Vec3 | Self::IVec3 => 3,
            Self::Vec4 | Self::IVec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
            Self::Array(element, len) => element.float_count() * len,
            Self::Struct(members) => members.iter().map(Self::float_count).sum(),
        }
    }

    /// The element type for arrays, `self` otherwise.
    #[must_use]
    pub fn element(&self) -> &Self {
        match self {
            Self::Array(element, _) => element,
            _ => self,
        }
    }

    /// Whether this is an integer (or bool) scalar or vector.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::IVec2 | Self::IVec3 | Self::IVec4
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Vec2 => f.write_str("vec2"),
            Self::Vec3 => f.write_str("vec3"),
            Self::Vec4 => f.write_str("vec4"),
            Self::IVec2 => f.write_str("ivec2"),
            Self::IVec3 => f.write_str("ivec3"),
            Self::IVec4 => f.write_str("ivec4"),
            Self::Mat2 => f.write_str("mat2"),
            Self::Mat3 => f.write_str("mat3"),
            Self::Mat4 => f.write_str("mat4"),
            Self::Array(element, len) => write!(f, "[{len}]{element}"),
            Self::Struct(members) => {
                f.write_str("struct{")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A complete shader program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    /// Uniform types; the first [`PRESERVED_UNIFORM_COUNT`] are preserved.
    pub uniforms: Vec<Type>,
    /// Number of `sampler2D` uniforms `T0..`.
    pub texture_count: usize,
    /// Vertex attribute types `A0..`.
    pub attributes: Vec<Type>,
    /// Varying types `V0..`.
    pub varyings: Vec<Type>,
    /// Helper functions, callable from either entry point.
    pub funcs: Vec<Func>,
    /// Vertex entry point body.
    pub vertex_func: Option<Block>,
    /// Fragment entry point body. Its `Return` yields the output color.
    pub fragment_func: Option<Block>,
}

/// A helper function `F#`.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    /// The `#` in `F#`.
    pub index: usize,
    /// `in` parameter types.
    pub in_params: Vec<Type>,
    /// `out` parameter types.
    pub out_params: Vec<Type>,
    /// Return type; [`Type::None`] for `void`.
    pub ret: Type,
    /// Body.
    pub block: Block,
}

/// A scope with its own local variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// Types of the locals declared in this scope.
    pub local_vars: Vec<Type>,
    /// Index of the first local declared here.
    pub local_var_index_offset: usize,
    /// Statements in order.
    pub stmts: Vec<Stmt>,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// An expression evaluated for its side effects.
    Expr(Expr),
    /// A nested scope.
    Block(Block),
    /// `lhs = rhs`.
    Assign(Expr, Expr),
    /// Re-initializes local `#` to its zero value.
    Init(usize),
    /// `if (cond) { then } else { otherwise }`.
    If {
        /// Condition.
        cond: Expr,
        /// Taken branch.
        then: Block,
        /// Optional else branch.
        otherwise: Option<Block>,
    },
    /// A counted loop over a constant range.
    For {
        /// Type of the loop counter.
        var_type: Type,
        /// Local index of the loop counter.
        var_index: usize,
        /// Initial counter value.
        init: Constant,
        /// Bound compared against with `op`.
        end: Constant,
        /// Comparison operator.
        op: Op,
        /// Step added each iteration.
        delta: Constant,
        /// Loop body.
        body: Block,
    },
    /// `continue`.
    Continue,
    /// `break`.
    Break,
    /// `return` with an optional value.
    Return(Option<Expr>),
    /// `discard`; fragment only.
    Discard,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal.
    Number(Constant),
    /// Uniform `U#`.
    Uniform(usize),
    /// Sampler `T#`.
    Texture(usize),
    /// Local variable `#`, named by its scope.
    Local(usize),
    /// Struct member `M#`, used as the right side of a field selector.
    StructMember(usize),
    /// A built-in function, used as a callee.
    Builtin(BuiltinFunc),
    /// A swizzle such as `xy`, used as the right side of a field selector.
    Swizzle(String),
    /// Helper function `F#`, used as a callee.
    Function(usize),
    /// `op(expr)`.
    Unary(Op, Box<Expr>),
    /// `(lhs) op (rhs)`.
    Binary(Op, Box<Expr>, Box<Expr>),
    /// `(cond) ? (a) : (b)`.
    Selection(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `callee(args...)`.
    Call(Box<Expr>, Vec<Expr>),
    /// `(expr).field`.
    FieldSelector(Box<Expr>, Box<Expr>),
    /// `(expr)[index]`.
    Index(Box<Expr>, Box<Expr>),
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Constant {
    /// The value as `f64`; bools map to `0.0` / `1.0`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Int(i) => i as f64,
            Self::Float(x) => x,
        }
    }

    /// The negated value.
    #[must_use]
    pub fn neg(self) -> Self {
        match self {
            Self::Bool(b) => Self::Bool(!b),
            Self::Int(i) => Self::Int(-i),
            Self::Float(x) => Self::Float(-x),
        }
    }
}

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Op {
    Add,
    Sub,
    Not,
    ComponentWiseMul,
    MatrixMul,
    Div,
    Mod,
    LeftShift,
    RightShift,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
    VectorEqual,
    VectorNotEqual,
    And,
    Xor,
    Or,
    AndAnd,
    OrOr,
}

impl Op {
    /// The GLSL token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Not => "!",
            Self::ComponentWiseMul | Self::MatrixMul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::Equal | Self::VectorEqual => "==",
            Self::NotEqual | Self::VectorNotEqual => "!=",
            Self::And => "&",
            Self::Xor => "^",
            Self::Or => "|",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        }
    }

    /// Whether the operator can end a `for` condition.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::LessThanEqual
                | Self::GreaterThan
                | Self::GreaterThanEqual
                | Self::Equal
                | Self::NotEqual
        )
    }
}

/// Built-in functions and constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BuiltinFunc {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
    Radians,
    Degrees,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Pow,
    Exp,
    Log,
    Exp2,
    Log2,
    Sqrt,
    Inversesqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Mod,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    Smoothstep,
    Length,
    Distance,
    Dot,
    Cross,
    Normalize,
    Faceforward,
    Reflect,
    Refract,
    Transpose,
    Dfdx,
    Dfdy,
    Fwidth,
    /// Samples a texture: `texture2D` or `texture` depending on dialect.
    TexelAt,
}

impl BuiltinFunc {
    /// The name shared by every GLSL dialect, or `None` when the name is
    /// dialect-dependent.
    #[must_use]
    pub const fn common_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Radians => "radians",
            Self::Degrees => "degrees",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan | Self::Atan2 => "atan",
            Self::Pow => "pow",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Exp2 => "exp2",
            Self::Log2 => "log2",
            Self::Sqrt => "sqrt",
            Self::Inversesqrt => "inversesqrt",
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Fract => "fract",
            Self::Mod => "mod",
            Self::Min => "min",
            Self::Max => "max",
            Self::Clamp => "clamp",
            Self::Mix => "mix",
            Self::Step => "step",
            Self::Smoothstep => "smoothstep",
            Self::Length => "length",
            Self::Distance => "distance",
            Self::Dot => "dot",
            Self::Cross => "cross",
            Self::Normalize => "normalize",
            Self::Faceforward => "faceforward",
            Self::Reflect => "reflect",
            Self::Refract => "refract",
            Self::Transpose => "transpose",
            Self::Dfdx => "dFdx",
            Self::Dfdy => "dFdy",
            Self::Fwidth => "fwidth",
            Self::TexelAt => return None,
        })
    }
}

/// Checks that `s` is a 1–4 character swizzle drawn from a single set
/// (`xyzw`, `rgba` or `stpq`).
#[must_use]
pub fn is_valid_swizzle(s: &str) -> bool {
    if s.is_empty() || s.len() > 4 {
        return false;
    }
    ["xyzw", "rgba", "stpq"]
        .iter()
        .any(|set| s.chars().all(|c| set.contains(c)))
}

impl Program {
    /// Indices of helper functions reachable from `block`, sorted.
    #[must_use]
    pub fn reachable_funcs(&self, block: &Block) -> Vec<usize> {
        let mut visited = Vec::new();
        let mut pending = Vec::new();
        collect_calls(block, &mut pending);
        while let Some(index) = pending.pop() {
            if visited.contains(&index) {
                continue;
            }
            visited.push(index);
            if let Some(f) = self.funcs.iter().find(|f| f.index == index) {
                collect_calls(&f.block, &mut pending);
            }
        }
        visited.sort_unstable();
        visited
    }
}

fn collect_calls(block: &Block, out: &mut Vec<usize>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Expr(e) | Stmt::Return(Some(e)) => collect_expr_calls(e, out),
            Stmt::Assign(lhs, rhs) => {
                collect_expr_calls(lhs, out);
                collect_expr_calls(rhs, out);
            }
            Stmt::Block(b) | Stmt::For { body: b, .. } => collect_calls(b, out),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                collect_expr_calls(cond, out);
                collect_calls(then, out);
                if let Some(b) = otherwise {
                    collect_calls(b, out);
                }
            }
            Stmt::Init(_) | Stmt::Continue | Stmt::Break | Stmt::Return(None) | Stmt::Discard => {}
        }
    }
}

fn collect_expr_calls(expr: &Expr, out: &mut Vec<usize>) {
    match expr {
        Expr::Function(index) => out.push(*index),
        Expr::Unary(_, e) => collect_expr_calls(e, out),
        Expr::Binary(_, a, b) | Expr::FieldSelector(a, b) | Expr::Index(a, b) => {
            collect_expr_calls(a, out);
            collect_expr_calls(b, out);
        }
        Expr::Selection(a, b, c) => {
            collect_expr_calls(a, out);
            collect_expr_calls(b, out);
            collect_expr_calls(c, out);
        }
        Expr::Call(callee, args) => {
            collect_expr_calls(callee, out);
            for a in args {
                collect_expr_calls(a, out);
            }
        }
        Expr::Number(_)
        | Expr::Uniform(_)
        | Expr::Texture(_)
        | Expr::Local(_)
        | Expr::StructMember(_)
        | Expr::Builtin(_)
        | Expr::Swizzle(_) => {}
    }
}
