//! WGSL program compilation.
//!
//! A program is a vertex module plus a fragment module. wgpu reports invalid
//! WGSL through its error scopes, so compilation runs inside one and the
//! diagnostic is turned into a [`RenderError`].

use crate::error::{RenderError, RenderResult};

/// WGSL sources of a program. Each module must define its entry point.
#[derive(Clone, Copy, Debug)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Compiled shader modules, vertex entry `vs_main`, fragment entry `fs_main`.
pub struct Program {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

pub fn compile_program(
    device: &wgpu::Device,
    label: &str,
    source: ProgramSource<'_>,
) -> RenderResult<Program> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} vertex", label)),
        source: wgpu::ShaderSource::Wgsl(source.vertex.into()),
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} fragment", label)),
        source: wgpu::ShaderSource::Wgsl(source.fragment.into()),
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let message = err.to_string();
        log::error!("failed to compile program {:?}:", label);
        for line in message.lines() {
            log::error!("  {}", line);
        }
        return Err(RenderError::ShaderCompilation {
            label: label.to_string(),
            message,
        });
    }

    log::debug!("compiled program {:?}", label);
    Ok(Program { vertex, fragment })
}
