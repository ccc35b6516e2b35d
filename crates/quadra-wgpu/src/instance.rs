use quadra::{DrawCommand, Shape};

/// Instance data for one clipped primitive quad.
///
/// The parameter slots are interpreted by the fragment program of the
/// primitive kind:
///
/// | kind          | `params0`                        | `params1`            |
/// |---------------|----------------------------------|----------------------|
/// | fill circle   | center, radius, 0                | 0                    |
/// | stroke circle | center, radius, half line width  | 0                    |
/// | line          | origin, unit direction           | length, half width   |
/// | fill rect     | left, top, right, bottom         | 0                    |
/// | stroke rect   | left, top, right, bottom         | half line width      |
/// | textured      | 0                                | 0                    |
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeInstance {
    /// Clipped quad in screen pixels: left, top, right, bottom
    pub rect: [f32; 4],
    /// RGBA, alpha may exceed 1
    pub color: [f32; 4],
    pub params0: [f32; 4],
    pub params1: [f32; 4],
    /// Texture coords at the top-left and bottom-right corners of `rect`
    pub uv: [f32; 4],
}

impl ShapeInstance {
    /// Vertex buffer layout for instance attributes
    pub const fn desc() -> wgpu::VertexBufferLayout<'static> {
        const VEC4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
            // rect at location 1
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            // color at location 2
            wgpu::VertexAttribute {
                offset: VEC4,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
            // params0 at location 3
            wgpu::VertexAttribute {
                offset: VEC4 * 2,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
            // params1 at location 4
            wgpu::VertexAttribute {
                offset: VEC4 * 3,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x4,
            },
            // uv at location 5
            wgpu::VertexAttribute {
                offset: VEC4 * 4,
                shader_location: 5,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: ATTRIBUTES,
        }
    }
}

impl From<&DrawCommand> for ShapeInstance {
    fn from(cmd: &DrawCommand) -> Self {
        let q = cmd.quad;
        let mut instance = Self {
            rect: [q.left, q.top, q.right, q.bottom],
            color: cmd.color.to_array(),
            params0: [0.0; 4],
            params1: [0.0; 4],
            uv: [0.0; 4],
        };

        match cmd.shape {
            Shape::FillCircle { center, radius } => {
                instance.params0 = [center.x, center.y, radius, 0.0];
            }
            Shape::StrokeCircle {
                center,
                radius,
                half_line_width,
            } => {
                instance.params0 = [center.x, center.y, radius, half_line_width];
            }
            Shape::Line {
                origin,
                dir,
                length,
                half_line_width,
            } => {
                instance.params0 = [origin.x, origin.y, dir.x, dir.y];
                instance.params1 = [length, half_line_width, 0.0, 0.0];
            }
            Shape::FillRect { edges } => {
                instance.params0 = [edges.left, edges.top, edges.right, edges.bottom];
            }
            Shape::StrokeRect {
                edges,
                half_line_width,
            } => {
                instance.params0 = [edges.left, edges.top, edges.right, edges.bottom];
                instance.params1 = [half_line_width, 0.0, 0.0, 0.0];
            }
            Shape::Textured { uv } => {
                instance.uv = uv.to_array();
            }
        }

        instance
    }
}
