use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};
use crate::error::{EngineError, Result};

/// Thin wrapper over the WebGL2 context
pub struct WebGLContext {
    pub gl: GL,
}

/// Colour texture plus optional depth attachment bound to one framebuffer
pub struct RenderTarget {
    pub framebuffer: WebGlFramebuffer,
    pub texture: WebGlTexture,
    pub depth: Option<WebGlRenderbuffer>,
    pub width: i32,
    pub height: i32,
}

impl WebGLContext {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    pub fn compile_shader(&self, shader_type: u32, source: &str) -> Result<WebGlShader> {
        let gl = &self.gl;

        let shader = gl
            .create_shader(shader_type)
            .ok_or(EngineError::Resource("shader"))?;
        gl.shader_source(&shader, source);
        gl.compile_shader(&shader);

        if gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(&shader).unwrap_or_default();
            gl.delete_shader(Some(&shader));
            Err(EngineError::Shader(log))
        }
    }

    pub fn create_program(&self, vert_src: &str, frag_src: &str) -> Result<WebGlProgram> {
        let gl = &self.gl;

        let vert = self.compile_shader(GL::VERTEX_SHADER, vert_src)?;
        let frag = self.compile_shader(GL::FRAGMENT_SHADER, frag_src)?;

        let program = gl.create_program().ok_or(EngineError::Resource("program"))?;
        gl.attach_shader(&program, &vert);
        gl.attach_shader(&program, &frag);
        gl.link_program(&program);

        // Linked programs keep their own copy
        gl.delete_shader(Some(&vert));
        gl.delete_shader(Some(&frag));

        if gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            Err(EngineError::Program(log))
        }
    }

    pub fn create_buffer_f32(&self, data: &[f32], usage: u32) -> Result<WebGlBuffer> {
        let buffer = self.gl.create_buffer().ok_or(EngineError::Resource("buffer"))?;
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        self.upload_f32(GL::ARRAY_BUFFER, data, usage);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
        Ok(buffer)
    }

    /// Replace the whole contents of an existing vertex buffer
    pub fn update_buffer_f32(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.upload_f32(GL::ARRAY_BUFFER, data, GL::DYNAMIC_DRAW);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
    }

    fn upload_f32(&self, target: u32, data: &[f32], usage: u32) {
        // Safety: the view is consumed by buffer_data before any allocation
        // can move wasm memory.
        unsafe {
            let array = js_sys::Float32Array::view(data);
            self.gl
                .buffer_data_with_array_buffer_view(target, &array, usage);
        }
    }

    pub fn create_index_buffer(&self, data: &[u32], usage: u32) -> Result<WebGlBuffer> {
        let gl = &self.gl;

        let buffer = gl
            .create_buffer()
            .ok_or(EngineError::Resource("index buffer"))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffer));

        unsafe {
            let array = js_sys::Uint32Array::view(data);
            gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &array, usage);
        }

        // Left bound: callers record it into the active VAO
        Ok(buffer)
    }

    pub fn create_vao(&self) -> Result<WebGlVertexArrayObject> {
        self.gl
            .create_vertex_array()
            .ok_or(EngineError::Resource("vertex array"))
    }

    /// Point a float attribute at the currently bound array buffer
    pub fn float_attribute(&self, location: u32, size: i32, stride: i32, offset: i32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, stride, offset);
    }

    /// Bind a per-instance mat4 across four consecutive attribute slots
    pub fn instanced_mat4_attribute(&self, first_location: u32) {
        let stride = 16 * 4;
        for column in 0..4u32 {
            let location = first_location + column;
            self.float_attribute(location, 4, stride, (column * 16) as i32);
            self.gl.vertex_attrib_divisor(location, 1);
        }
    }

    pub fn create_texture(&self, width: i32, height: i32) -> Result<WebGlTexture> {
        let gl = &self.gl;

        let texture = gl.create_texture().ok_or(EngineError::Resource("texture"))?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));

        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA8 as i32,
            width,
            height,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            None,
        )
        .map_err(|e| EngineError::Context(format!("texture allocation: {:?}", e)))?;

        for (param, value) in [
            (GL::TEXTURE_MIN_FILTER, GL::LINEAR),
            (GL::TEXTURE_MAG_FILTER, GL::LINEAR),
            (GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE),
            (GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE),
        ] {
            gl.tex_parameteri(GL::TEXTURE_2D, param, value as i32);
        }

        gl.bind_texture(GL::TEXTURE_2D, None);
        Ok(texture)
    }

    /// Offscreen colour target; `with_depth` adds a 24-bit depth renderbuffer
    pub fn create_render_target(&self, width: i32, height: i32, with_depth: bool) -> Result<RenderTarget> {
        let gl = &self.gl;
        let width = width.max(1);
        let height = height.max(1);

        let texture = self.create_texture(width, height)?;
        let framebuffer = gl
            .create_framebuffer()
            .ok_or(EngineError::Resource("framebuffer"))?;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::COLOR_ATTACHMENT0,
            GL::TEXTURE_2D,
            Some(&texture),
            0,
        );

        let depth = if with_depth {
            let rb = gl
                .create_renderbuffer()
                .ok_or(EngineError::Resource("renderbuffer"))?;
            gl.bind_renderbuffer(GL::RENDERBUFFER, Some(&rb));
            gl.renderbuffer_storage(GL::RENDERBUFFER, GL::DEPTH_COMPONENT24, width, height);
            gl.framebuffer_renderbuffer(
                GL::FRAMEBUFFER,
                GL::DEPTH_ATTACHMENT,
                GL::RENDERBUFFER,
                Some(&rb),
            );
            gl.bind_renderbuffer(GL::RENDERBUFFER, None);
            Some(rb)
        } else {
            None
        };

        let status = gl.check_framebuffer_status(GL::FRAMEBUFFER);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        if status != GL::FRAMEBUFFER_COMPLETE {
            return Err(EngineError::Framebuffer(status));
        }

        Ok(RenderTarget {
            framebuffer,
            texture,
            depth,
            width,
            height,
        })
    }

    pub fn delete_render_target(&self, target: &RenderTarget) {
        self.gl.delete_framebuffer(Some(&target.framebuffer));
        self.gl.delete_texture(Some(&target.texture));
        if let Some(depth) = &target.depth {
            self.gl.delete_renderbuffer(Some(depth));
        }
    }

    /// Bind a target for drawing and size the viewport to it; `None` is the canvas
    pub fn bind_target(&self, target: Option<&RenderTarget>, canvas_size: (i32, i32)) {
        match target {
            Some(t) => {
                self.gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&t.framebuffer));
                self.gl.viewport(0, 0, t.width, t.height);
            }
            None => {
                self.gl.bind_framebuffer(GL::FRAMEBUFFER, None);
                self.gl.viewport(0, 0, canvas_size.0, canvas_size.1);
            }
        }
    }

    pub fn bind_texture_unit(&self, unit: u32, texture: &WebGlTexture) {
        self.gl.active_texture(GL::TEXTURE0 + unit);
        self.gl.bind_texture(GL::TEXTURE_2D, Some(texture));
    }

    pub fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    pub fn uniform_1f(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        self.gl.uniform1f(location, value);
    }

    pub fn uniform_2f(&self, location: Option<&WebGlUniformLocation>, x: f32, y: f32) {
        self.gl.uniform2f(location, x, y);
    }

    pub fn uniform_3f(&self, location: Option<&WebGlUniformLocation>, v: [f32; 3]) {
        self.gl.uniform3f(location, v[0], v[1], v[2]);
    }

    pub fn uniform_matrix4fv(&self, location: Option<&WebGlUniformLocation>, data: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(location, false, data);
    }

    pub fn uniform_1i(&self, location: Option<&WebGlUniformLocation>, value: i32) {
        self.gl.uniform1i(location, value);
    }

    pub fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    /// Opaque geometry: depth test and write, no blending
    pub fn opaque_state(&self) {
        self.gl.enable(GL::DEPTH_TEST);
        self.gl.depth_mask(true);
        self.gl.disable(GL::BLEND);
    }

    /// Glowing points: depth tested against opaque geometry but not written,
    /// summed additively
    pub fn additive_state(&self) {
        self.gl.enable(GL::DEPTH_TEST);
        self.gl.depth_mask(false);
        self.gl.enable(GL::BLEND);
        self.gl.blend_func(GL::SRC_ALPHA, GL::ONE);
    }

    /// Fullscreen passes
    pub fn overlay_state(&self) {
        self.gl.disable(GL::DEPTH_TEST);
        self.gl.depth_mask(true);
        self.gl.disable(GL::BLEND);
    }
}
