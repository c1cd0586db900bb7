//! Vertex layout, persistent vertex / index buffers and program activation.

use log::{debug, warn};

use crate::config::Config;
use crate::context::{Buffer, Context, Program, Texture, UniformLocation, VertexArray};
use crate::error::{Error, ResourceKind, Result};
use crate::ir::Type;
use crate::state::StateTracker;
use crate::types::Vertex;

/// GLSL names of the vertex attributes, bound to slots `0..3`.
pub(crate) const ATTRIBUTE_NAMES: [&str; 4] = ["A0", "A1", "A2", "A3"];

/// Float counts of the attribute parts: position, tex coord, tex region,
/// color scale.
const ATTRIBUTE_PARTS: [i32; 4] = [2, 2, 4, 4];

/// Bytes per vertex in the array buffer.
pub const VERTEX_SIZE_IN_BYTES: usize = Vertex::FLOAT_COUNT * std::mem::size_of::<f32>();

/// One uniform value headed for the current program.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UniformVariable {
    pub(crate) name: String,
    /// Scalars in GL upload order; integers are carried as whole floats.
    pub(crate) value: Vec<f32>,
    pub(crate) ty: Type,
}

impl UniformVariable {
    pub(crate) fn new(name: impl Into<String>, value: Vec<f32>, ty: Type) -> Self {
        Self {
            name: name.into(),
            value,
            ty,
        }
    }
}

/// The array buffer, the element array buffer and, where the dialect has
/// them, the vertex array object that records their layout.
#[derive(Debug)]
pub(crate) struct VertexBuffers {
    vertex_array: VertexArray,
    array_buffer: Buffer,
    element_array_buffer: Buffer,
    array_capacity: usize,
    element_capacity: usize,
}

impl VertexBuffers {
    /// Allocates both buffers at the capacity `config` asks for, without
    /// initial contents. Leaves them bound.
    pub(crate) fn new(ctx: &mut dyn Context, config: &Config) -> Result<Self> {
        let vertex_array = if ctx.api().has_vertex_arrays() {
            let array = ctx.create_vertex_array();
            if array.is_none() {
                return Err(Error::AllocationFailed(ResourceKind::VertexArray));
            }
            ctx.bind_vertex_array(array);
            array
        } else {
            VertexArray::NONE
        };

        let array_capacity = config.array_buffer_size();
        let element_capacity = config.element_array_buffer_size();
        let buffers = new_buffer(ctx, glow::ARRAY_BUFFER, array_capacity).and_then(|array| {
            match new_buffer(ctx, glow::ELEMENT_ARRAY_BUFFER, element_capacity) {
                Ok(element) => Ok((array, element)),
                Err(err) => {
                    ctx.delete_buffer(array);
                    Err(err)
                }
            }
        });
        let (array_buffer, element_array_buffer) = match buffers {
            Ok(buffers) => buffers,
            Err(err) => {
                if !vertex_array.is_none() {
                    ctx.delete_vertex_array(vertex_array);
                }
                return Err(err);
            }
        };

        debug!("allocated vertex buffers ({array_capacity} + {element_capacity} bytes)");
        Ok(Self {
            vertex_array,
            array_buffer,
            element_array_buffer,
            array_capacity,
            element_capacity,
        })
    }

    /// Binds both buffers and points the four attributes into the array
    /// buffer.
    pub(crate) fn bind(&self, ctx: &mut dyn Context) {
        if !self.vertex_array.is_none() {
            ctx.bind_vertex_array(self.vertex_array);
        }
        ctx.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
        ctx.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.element_array_buffer);

        let stride = i32::try_from(VERTEX_SIZE_IN_BYTES).unwrap_or(i32::MAX);
        let mut offset = 0;
        for (index, size) in (0u32..).zip(ATTRIBUTE_PARTS) {
            ctx.enable_vertex_attrib_array(index);
            ctx.vertex_attrib_pointer(index, size, glow::FLOAT, false, stride, offset);
            offset += size.unsigned_abs() as usize * std::mem::size_of::<f32>();
        }
    }

    /// Replaces the head of both buffers.
    pub(crate) fn upload(
        &self,
        ctx: &mut dyn Context,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<()> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        if vertex_bytes.len() > self.array_capacity || index_bytes.len() > self.element_capacity {
            return Err(Error::BatchTooLarge {
                vertices: vertices.len(),
                indices: indices.len(),
            });
        }
        ctx.buffer_sub_data(glow::ARRAY_BUFFER, 0, vertex_bytes);
        ctx.buffer_sub_data(glow::ELEMENT_ARRAY_BUFFER, 0, index_bytes);
        Ok(())
    }

    pub(crate) fn delete(self, ctx: &mut dyn Context) {
        ctx.delete_buffer(self.array_buffer);
        ctx.delete_buffer(self.element_array_buffer);
        if !self.vertex_array.is_none() {
            ctx.delete_vertex_array(self.vertex_array);
        }
    }
}

fn new_buffer(ctx: &mut dyn Context, target: u32, size: usize) -> Result<Buffer> {
    let buffer = ctx.create_buffer();
    if buffer.is_none() {
        return Err(Error::AllocationFailed(ResourceKind::Buffer));
    }
    ctx.bind_buffer(target, buffer);
    ctx.buffer_init(target, size, glow::DYNAMIC_DRAW);
    Ok(buffer)
}

/// Makes `program` current and brings its uniforms and samplers up to date.
///
/// `textures[i]` is bound to unit `i` and sampler `T{i}`; [`Texture::NONE`]
/// slots are skipped. A texture appearing twice shares the first unit.
pub(crate) fn use_program(
    state: &mut StateTracker,
    buffers: &VertexBuffers,
    program: Program,
    uniforms: &[UniformVariable],
    textures: &[Texture],
) -> Result<()> {
    if state.last_program != program {
        state.ctx.use_program(program);
        if state.last_program.is_none() {
            buffers.bind(state.ctx.as_mut());
        }
        state.last_program = program;
        state.last_uniforms.clear();
        state.last_active_texture = 0;
        state.ctx.active_texture(glow::TEXTURE0);
        state.forget_texture();
    }

    for uniform in uniforms {
        let expected = uniform.ty.float_count();
        if uniform.value.len() != expected {
            return Err(Error::UniformLength {
                name: uniform.name.clone(),
                expected,
                got: uniform.value.len(),
            });
        }

        let bits: Vec<u32> = uniform.value.iter().map(|v| v.to_bits()).collect();
        if state.last_uniforms.get(&uniform.name) == Some(&bits) {
            continue;
        }
        let location = state
            .locations
            .get(state.ctx.as_mut(), program, &uniform.name);
        if !location.is_valid() {
            continue;
        }
        upload_uniform(state.ctx.as_mut(), location, &uniform.ty, &uniform.value);
        state.last_uniforms.insert(uniform.name.clone(), bits);
    }

    let mut activated: Vec<(Texture, u32)> = Vec::with_capacity(textures.len());
    for (unit, texture) in (0u32..).zip(textures.iter().copied()) {
        if texture.is_none() {
            continue;
        }
        let name = format!("T{unit}");
        let target = activated
            .iter()
            .find(|(native, _)| *native == texture)
            .map(|(_, first)| *first);
        let sampler_unit = target.unwrap_or(unit);
        set_sampler(state, program, name, sampler_unit);
        if target.is_some() {
            continue;
        }
        activated.push((texture, unit));

        if state.last_active_texture != unit {
            state.ctx.active_texture(glow::TEXTURE0 + unit);
            state.last_active_texture = unit;
        }
        // Bindings can change outside our control; always rebind.
        state.forget_texture();
        state.bind_texture(texture);
    }
    Ok(())
}

fn set_sampler(state: &mut StateTracker, program: Program, name: String, unit: u32) {
    let bits = vec![unit];
    if state.last_uniforms.get(&name) == Some(&bits) {
        return;
    }
    let location = state.locations.get(state.ctx.as_mut(), program, &name);
    if !location.is_valid() {
        return;
    }
    state
        .ctx
        .uniform_1i(location, i32::try_from(unit).unwrap_or_default());
    state.last_uniforms.insert(name, bits);
}

#[expect(clippy::cast_possible_truncation)]
fn to_ints(values: &[f32]) -> Vec<i32> {
    values.iter().map(|v| *v as i32).collect()
}

/// Dispatches on the declared type: `float` → `1f`, `vecN` → `Nfv`,
/// `matN` → `MatrixNfv`, integer kinds → `1i` / `Niv`. Arrays use the
/// element's call with the whole slice.
fn upload_uniform(ctx: &mut dyn Context, location: UniformLocation, ty: &Type, value: &[f32]) {
    let is_array = matches!(ty, Type::Array(..));
    match ty.element() {
        Type::Float if !is_array => ctx.uniform_1f(location, value[0]),
        Type::Float => ctx.uniform_1fv(location, value),
        Type::Vec2 => ctx.uniform_2fv(location, value),
        Type::Vec3 => ctx.uniform_3fv(location, value),
        Type::Vec4 => ctx.uniform_4fv(location, value),
        Type::Bool | Type::Int if !is_array => {
            ctx.uniform_1i(location, to_ints(value)[0]);
        }
        Type::Bool | Type::Int => ctx.uniform_1iv(location, &to_ints(value)),
        Type::IVec2 => ctx.uniform_2iv(location, &to_ints(value)),
        Type::IVec3 => ctx.uniform_3iv(location, &to_ints(value)),
        Type::IVec4 => ctx.uniform_4iv(location, &to_ints(value)),
        Type::Mat2 => ctx.uniform_matrix_2fv(location, value),
        Type::Mat3 => ctx.uniform_matrix_3fv(location, value),
        Type::Mat4 => ctx.uniform_matrix_4fv(location, value),
        other @ (Type::None | Type::Array(..) | Type::Struct(_)) => {
            warn!("cannot upload a uniform of type {other}");
        }
    }
}
