use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlUniformLocation,
    WebGlVertexArrayObject,
};
use crate::error::Result;
use crate::interaction::OrbitCamera;
use crate::math::{Color, Mat4};
use crate::mesh::{Mesh, FLOATS_PER_VERTEX};
use crate::particles::foliage::{FoliageAttributes, FoliageUniforms};
use crate::particles::ornaments::{Appearance, FLOATS_PER_INSTANCE};
use crate::particles::stars::FLOATS_PER_STAR;
use super::settings::RenderSettings;
use super::shaders::*;
use super::webgl::{RenderTarget, WebGLContext};

struct FoliageLocations {
    model_view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    progress: Option<WebGlUniformLocation>,
    easing: Option<WebGlUniformLocation>,
    noise: Option<WebGlUniformLocation>,
    size_attenuation: Option<WebGlUniformLocation>,
    color_base: Option<WebGlUniformLocation>,
    color_tip: Option<WebGlUniformLocation>,
}

struct StarLocations {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
}

struct OrnamentLocations {
    group: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    metalness: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    tone_mapped: Option<WebGlUniformLocation>,
    exposure: Option<WebGlUniformLocation>,
    camera_pos: Option<WebGlUniformLocation>,
    ambient_color: Option<WebGlUniformLocation>,
    key_position: Option<WebGlUniformLocation>,
    key_color: Option<WebGlUniformLocation>,
    fill_position: Option<WebGlUniformLocation>,
    fill_color: Option<WebGlUniformLocation>,
    core_position: Option<WebGlUniformLocation>,
    core_color: Option<WebGlUniformLocation>,
    core_range: Option<WebGlUniformLocation>,
}

struct PostLocations {
    extract_texture: Option<WebGlUniformLocation>,
    threshold: Option<WebGlUniformLocation>,
    blur_texture: Option<WebGlUniformLocation>,
    direction: Option<WebGlUniformLocation>,
    scene: Option<WebGlUniformLocation>,
    bloom: Option<WebGlUniformLocation>,
    bloom_strength: Option<WebGlUniformLocation>,
    vignette_offset: Option<WebGlUniformLocation>,
    vignette_darkness: Option<WebGlUniformLocation>,
    grain: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
}

/// Point cloud drawn with `gl.POINTS`
struct PointBatch {
    vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    count: i32,
}

/// One ornament field: a shared mesh drawn once per instance matrix
struct OrnamentBatch {
    vao: WebGlVertexArrayObject,
    buffers: Vec<WebGlBuffer>,
    instance_buffer: WebGlBuffer,
    index_count: i32,
    instance_count: i32,
    color: Color,
    appearance: Appearance,
}

/// Bloom works at half the canvas resolution
pub fn bloom_resolution(width: i32, height: i32) -> (i32, i32) {
    ((width / 2).max(1), (height / 2).max(1))
}

fn rgb(color: Color) -> [f32; 3] {
    color.to_vec3().to_array()
}

fn rgb_scaled(color: Color, intensity: f32) -> [f32; 3] {
    color.to_vec3().scale(intensity).to_array()
}

/// Forward renderer plus bloom/vignette/grain post chain for the whole scene
pub struct RenderPipeline {
    ctx: WebGLContext,
    settings: RenderSettings,

    foliage_program: WebGlProgram,
    star_program: WebGlProgram,
    ornament_program: WebGlProgram,
    bloom_extract_program: WebGlProgram,
    blur_program: WebGlProgram,
    composite_program: WebGlProgram,

    foliage_locations: FoliageLocations,
    star_locations: StarLocations,
    ornament_locations: OrnamentLocations,
    post_locations: PostLocations,

    foliage: Option<PointBatch>,
    stars: Option<PointBatch>,
    ornaments: Vec<OrnamentBatch>,

    scene_target: RenderTarget,
    bloom_targets: [RenderTarget; 2],

    width: i32,
    height: i32,
}

impl RenderPipeline {
    pub fn new(gl: GL, width: i32, height: i32, settings: RenderSettings) -> Result<Self> {
        let ctx = WebGLContext::new(gl);

        let foliage_program = ctx.create_program(FOLIAGE_VERTEX_SHADER, FOLIAGE_FRAGMENT_SHADER)?;
        let star_program = ctx.create_program(STAR_VERTEX_SHADER, STAR_FRAGMENT_SHADER)?;
        let ornament_program = ctx.create_program(ORNAMENT_VERTEX_SHADER, ORNAMENT_FRAGMENT_SHADER)?;
        let bloom_extract_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, BLOOM_EXTRACT_SHADER)?;
        let blur_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, BLUR_SHADER)?;
        let composite_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, COMPOSITE_SHADER)?;

        let foliage_locations = {
            let p = &foliage_program;
            FoliageLocations {
                model_view: ctx.uniform_location(p, "u_model_view"),
                projection: ctx.uniform_location(p, "u_projection"),
                time: ctx.uniform_location(p, "u_time"),
                progress: ctx.uniform_location(p, "u_progress"),
                easing: ctx.uniform_location(p, "u_easing"),
                noise: ctx.uniform_location(p, "u_noise"),
                size_attenuation: ctx.uniform_location(p, "u_size_attenuation"),
                color_base: ctx.uniform_location(p, "u_color_base"),
                color_tip: ctx.uniform_location(p, "u_color_tip"),
            }
        };

        let star_locations = StarLocations {
            view: ctx.uniform_location(&star_program, "u_view"),
            projection: ctx.uniform_location(&star_program, "u_projection"),
            time: ctx.uniform_location(&star_program, "u_time"),
        };

        let ornament_locations = {
            let p = &ornament_program;
            OrnamentLocations {
                group: ctx.uniform_location(p, "u_group"),
                view: ctx.uniform_location(p, "u_view"),
                projection: ctx.uniform_location(p, "u_projection"),
                color: ctx.uniform_location(p, "u_color"),
                metalness: ctx.uniform_location(p, "u_metalness"),
                roughness: ctx.uniform_location(p, "u_roughness"),
                lit: ctx.uniform_location(p, "u_lit"),
                tone_mapped: ctx.uniform_location(p, "u_tone_mapped"),
                exposure: ctx.uniform_location(p, "u_exposure"),
                camera_pos: ctx.uniform_location(p, "u_camera_pos"),
                ambient_color: ctx.uniform_location(p, "u_ambient_color"),
                key_position: ctx.uniform_location(p, "u_key_position"),
                key_color: ctx.uniform_location(p, "u_key_color"),
                fill_position: ctx.uniform_location(p, "u_fill_position"),
                fill_color: ctx.uniform_location(p, "u_fill_color"),
                core_position: ctx.uniform_location(p, "u_core_position"),
                core_color: ctx.uniform_location(p, "u_core_color"),
                core_range: ctx.uniform_location(p, "u_core_range"),
            }
        };

        let post_locations = PostLocations {
            extract_texture: ctx.uniform_location(&bloom_extract_program, "u_texture"),
            threshold: ctx.uniform_location(&bloom_extract_program, "u_threshold"),
            blur_texture: ctx.uniform_location(&blur_program, "u_texture"),
            direction: ctx.uniform_location(&blur_program, "u_direction"),
            scene: ctx.uniform_location(&composite_program, "u_scene"),
            bloom: ctx.uniform_location(&composite_program, "u_bloom"),
            bloom_strength: ctx.uniform_location(&composite_program, "u_bloom_strength"),
            vignette_offset: ctx.uniform_location(&composite_program, "u_vignette_offset"),
            vignette_darkness: ctx.uniform_location(&composite_program, "u_vignette_darkness"),
            grain: ctx.uniform_location(&composite_program, "u_grain"),
            time: ctx.uniform_location(&composite_program, "u_time"),
        };

        let scene_target = ctx.create_render_target(width, height, true)?;
        let (bw, bh) = bloom_resolution(width, height);
        let bloom_targets = [
            ctx.create_render_target(bw, bh, false)?,
            ctx.create_render_target(bw, bh, false)?,
        ];

        log::info!("Render pipeline ready at {}x{}", width, height);

        Ok(Self {
            ctx,
            settings,
            foliage_program,
            star_program,
            ornament_program,
            bloom_extract_program,
            blur_program,
            composite_program,
            foliage_locations,
            star_locations,
            ornament_locations,
            post_locations,
            foliage: None,
            stars: None,
            ornaments: Vec::new(),
            scene_target,
            bloom_targets,
            width,
            height,
        })
    }

    /// Upload the baked foliage attributes, one buffer per attribute
    pub fn upload_foliage(&mut self, attributes: &FoliageAttributes) -> Result<()> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let mut buffers = Vec::with_capacity(5);
        let streams: [(&[f32], i32); 5] = [
            (&attributes.positions, 3),
            (&attributes.scatter_positions, 3),
            (&attributes.tree_positions, 3),
            (&attributes.randoms, 1),
            (&attributes.sizes, 1),
        ];
        for (location, (data, size)) in streams.iter().enumerate() {
            let buffer = self.ctx.create_buffer_f32(data, GL::STATIC_DRAW)?;
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
            self.ctx.float_attribute(location as u32, *size, 0, 0);
            buffers.push(buffer);
        }

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        log::debug!("Uploaded {} foliage points", attributes.len());

        if let Some(old) = self.foliage.replace(PointBatch {
            vao,
            buffers,
            count: attributes.len() as i32,
        }) {
            self.delete_points(&old);
        }
        Ok(())
    }

    /// Upload star data, `FLOATS_PER_STAR` floats per star
    pub fn upload_stars(&mut self, data: &[f32]) -> Result<()> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = self.ctx.create_buffer_f32(data, GL::STATIC_DRAW)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));

        let stride = (FLOATS_PER_STAR * 4) as i32;
        self.ctx.float_attribute(0, 3, stride, 0);
        self.ctx.float_attribute(1, 1, stride, 12);
        self.ctx.float_attribute(2, 1, stride, 16);
        self.ctx.float_attribute(3, 3, stride, 20);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        log::debug!("Uploaded {} stars", data.len() / FLOATS_PER_STAR);

        if let Some(old) = self.stars.replace(PointBatch {
            vao,
            buffers: vec![buffer],
            count: (data.len() / FLOATS_PER_STAR) as i32,
        }) {
            self.delete_points(&old);
        }
        Ok(())
    }

    /// Register an ornament field; returns its layer index for later updates
    pub fn upload_ornament_layer(
        &mut self,
        mesh: &Mesh,
        appearance: Appearance,
        color: Color,
        transforms: &[f32],
    ) -> Result<usize> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let vertex_buffer = self.ctx.create_buffer_f32(&mesh.vertex_data(), GL::STATIC_DRAW)?;
        let index_buffer = self.ctx.create_index_buffer(mesh.index_data(), GL::STATIC_DRAW)?;

        let stride = (FLOATS_PER_VERTEX * 4) as i32;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertex_buffer));
        self.ctx.float_attribute(0, 3, stride, 0);
        self.ctx.float_attribute(1, 3, stride, 12);

        let instance_buffer = self.ctx.create_buffer_f32(transforms, GL::DYNAMIC_DRAW)?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&instance_buffer));
        self.ctx.instanced_mat4_attribute(INSTANCE_MATRIX_LOCATION);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, None);
        log::debug!(
            "Uploaded ornament layer {}: {} triangles x {} instances",
            self.ornaments.len(),
            mesh.triangle_count(),
            transforms.len() / FLOATS_PER_INSTANCE
        );

        self.ornaments.push(OrnamentBatch {
            vao,
            buffers: vec![vertex_buffer, index_buffer],
            instance_buffer,
            index_count: mesh.index_data().len() as i32,
            instance_count: (transforms.len() / FLOATS_PER_INSTANCE) as i32,
            color,
            appearance,
        });
        Ok(self.ornaments.len() - 1)
    }

    /// Replace the instance matrices of one ornament layer
    pub fn update_ornament_instances(&mut self, layer: usize, transforms: &[f32]) {
        if let Some(batch) = self.ornaments.get_mut(layer) {
            self.ctx.update_buffer_f32(&batch.instance_buffer, transforms);
            batch.instance_count = (transforms.len() / FLOATS_PER_INSTANCE) as i32;
        }
    }

    fn delete_points(&self, batch: &PointBatch) {
        self.ctx.gl.delete_vertex_array(Some(&batch.vao));
        for buffer in &batch.buffers {
            self.ctx.gl.delete_buffer(Some(buffer));
        }
    }

    /// Draw one frame.
    ///
    /// `group` is the shared model matrix of the tree; stars stay in world space.
    pub fn render(&self, time: f32, foliage: &FoliageUniforms, group: &Mat4, camera: &OrbitCamera) {
        let gl = &self.ctx.gl;
        let canvas = (self.width, self.height);

        let aspect = self.width as f32 / self.height.max(1) as f32;
        let projection = camera.projection_matrix(aspect);
        let view = camera.view_matrix();

        // Pass 1: scene into the offscreen target
        self.ctx.bind_target(Some(&self.scene_target), canvas);
        let bg = self.settings.clear_color;
        self.ctx.clear(bg.r, bg.g, bg.b, 1.0);

        self.ctx.opaque_state();
        self.draw_ornaments(group, &view, &projection, camera);

        self.ctx.additive_state();
        if let Some(stars) = &self.stars {
            let loc = &self.star_locations;
            gl.use_program(Some(&self.star_program));
            self.ctx.uniform_matrix4fv(loc.view.as_ref(), view.as_slice());
            self.ctx.uniform_matrix4fv(loc.projection.as_ref(), projection.as_slice());
            self.ctx.uniform_1f(loc.time.as_ref(), time);
            gl.bind_vertex_array(Some(&stars.vao));
            gl.draw_arrays(GL::POINTS, 0, stars.count);
        }

        if let Some(points) = &self.foliage {
            let loc = &self.foliage_locations;
            let model_view = view.mul(group);
            gl.use_program(Some(&self.foliage_program));
            self.ctx.uniform_matrix4fv(loc.model_view.as_ref(), model_view.as_slice());
            self.ctx.uniform_matrix4fv(loc.projection.as_ref(), projection.as_slice());
            self.ctx.uniform_1f(loc.time.as_ref(), foliage.time);
            self.ctx.uniform_1f(loc.progress.as_ref(), foliage.morph_factor);
            self.ctx.uniform_1i(loc.easing.as_ref(), foliage.easing.shader_id());
            self.ctx.uniform_1f(loc.noise.as_ref(), foliage.noise_amplitude);
            self.ctx.uniform_1f(loc.size_attenuation.as_ref(), foliage.size_attenuation);
            self.ctx.uniform_3f(loc.color_base.as_ref(), rgb(foliage.color_base));
            self.ctx.uniform_3f(loc.color_tip.as_ref(), rgb(foliage.color_tip));
            gl.bind_vertex_array(Some(&points.vao));
            gl.draw_arrays(GL::POINTS, 0, points.count);
        }

        gl.bind_vertex_array(None);
        self.ctx.overlay_state();

        // Pass 2: bright-pass into bloom[0]
        let post = &self.post_locations;
        self.ctx.bind_target(Some(&self.bloom_targets[0]), canvas);
        gl.use_program(Some(&self.bloom_extract_program));
        self.ctx.bind_texture_unit(0, &self.scene_target.texture);
        self.ctx.uniform_1i(post.extract_texture.as_ref(), 0);
        self.ctx.uniform_1f(post.threshold.as_ref(), self.settings.bloom_threshold);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        // Passes 3 and 4: separable blur, ending back in bloom[0]
        gl.use_program(Some(&self.blur_program));
        self.ctx.uniform_1i(post.blur_texture.as_ref(), 0);

        self.ctx.bind_target(Some(&self.bloom_targets[1]), canvas);
        self.ctx.bind_texture_unit(0, &self.bloom_targets[0].texture);
        self.ctx.uniform_2f(post.direction.as_ref(), 1.0, 0.0);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        self.ctx.bind_target(Some(&self.bloom_targets[0]), canvas);
        self.ctx.bind_texture_unit(0, &self.bloom_targets[1].texture);
        self.ctx.uniform_2f(post.direction.as_ref(), 0.0, 1.0);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);

        // Pass 5: composite to the canvas
        self.ctx.bind_target(None, canvas);
        gl.use_program(Some(&self.composite_program));
        self.ctx.bind_texture_unit(0, &self.scene_target.texture);
        self.ctx.uniform_1i(post.scene.as_ref(), 0);
        self.ctx.bind_texture_unit(1, &self.bloom_targets[0].texture);
        self.ctx.uniform_1i(post.bloom.as_ref(), 1);
        self.ctx.uniform_1f(post.bloom_strength.as_ref(), self.settings.bloom_strength);
        self.ctx.uniform_1f(post.vignette_offset.as_ref(), self.settings.vignette_offset);
        self.ctx.uniform_1f(post.vignette_darkness.as_ref(), self.settings.vignette_darkness);
        self.ctx.uniform_1f(post.grain.as_ref(), self.settings.grain_opacity);
        self.ctx.uniform_1f(post.time.as_ref(), time);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }

    fn draw_ornaments(&self, group: &Mat4, view: &Mat4, projection: &Mat4, camera: &OrbitCamera) {
        if self.ornaments.is_empty() {
            return;
        }

        let gl = &self.ctx.gl;
        let loc = &self.ornament_locations;
        let lights = &self.settings.lighting;

        gl.use_program(Some(&self.ornament_program));
        self.ctx.uniform_matrix4fv(loc.group.as_ref(), group.as_slice());
        self.ctx.uniform_matrix4fv(loc.view.as_ref(), view.as_slice());
        self.ctx.uniform_matrix4fv(loc.projection.as_ref(), projection.as_slice());
        self.ctx.uniform_3f(loc.camera_pos.as_ref(), camera.position().to_array());
        self.ctx.uniform_1f(loc.exposure.as_ref(), self.settings.exposure);

        // Lights live in world space; the core light follows the tree group
        self.ctx.uniform_3f(
            loc.ambient_color.as_ref(),
            rgb_scaled(lights.ambient_color, lights.ambient_intensity),
        );
        self.ctx.uniform_3f(loc.key_position.as_ref(), lights.key_position.to_array());
        self.ctx.uniform_3f(loc.key_color.as_ref(), rgb_scaled(lights.key_color, lights.key_intensity));
        self.ctx.uniform_3f(loc.fill_position.as_ref(), lights.fill_position.to_array());
        self.ctx.uniform_3f(loc.fill_color.as_ref(), rgb_scaled(lights.fill_color, lights.fill_intensity));
        self.ctx.uniform_3f(
            loc.core_position.as_ref(),
            group.transform_point(lights.core_position).to_array(),
        );
        self.ctx.uniform_3f(loc.core_color.as_ref(), rgb_scaled(lights.core_color, lights.core_intensity));
        self.ctx.uniform_1f(loc.core_range.as_ref(), lights.core_range);

        for batch in &self.ornaments {
            if batch.instance_count == 0 {
                continue;
            }
            let look = &batch.appearance;
            self.ctx.uniform_3f(loc.color.as_ref(), rgb(batch.color));
            self.ctx.uniform_1f(loc.metalness.as_ref(), look.metalness);
            self.ctx.uniform_1f(loc.roughness.as_ref(), look.roughness);
            self.ctx.uniform_1i(loc.lit.as_ref(), look.lit as i32);
            self.ctx.uniform_1i(loc.tone_mapped.as_ref(), look.tone_mapped as i32);

            gl.bind_vertex_array(Some(&batch.vao));
            gl.draw_elements_instanced_with_i32(
                GL::TRIANGLES,
                batch.index_count,
                GL::UNSIGNED_INT,
                0,
                batch.instance_count,
            );
        }
    }

    /// Rebuild the offscreen targets for a new canvas size
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let scene_target = self.ctx.create_render_target(width, height, true)?;
        let (bw, bh) = bloom_resolution(width, height);
        let bloom_targets = [
            self.ctx.create_render_target(bw, bh, false)?,
            self.ctx.create_render_target(bw, bh, false)?,
        ];

        self.ctx.delete_render_target(&self.scene_target);
        for target in &self.bloom_targets {
            self.ctx.delete_render_target(target);
        }

        self.scene_target = scene_target;
        self.bloom_targets = bloom_targets;
        self.width = width;
        self.height = height;
        log::debug!("Render targets resized to {}x{}", width, height);
        Ok(())
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn layer_count(&self) -> usize {
        self.ornaments.len()
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        let gl = &self.ctx.gl;
        for batch in self.foliage.iter().chain(self.stars.iter()) {
            self.delete_points(batch);
        }
        for batch in &self.ornaments {
            gl.delete_vertex_array(Some(&batch.vao));
            gl.delete_buffer(Some(&batch.instance_buffer));
            for buffer in &batch.buffers {
                gl.delete_buffer(Some(buffer));
            }
        }
        self.ctx.delete_render_target(&self.scene_target);
        for target in &self.bloom_targets {
            self.ctx.delete_render_target(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_resolution_halves() {
        assert_eq!(bloom_resolution(1920, 1080), (960, 540));
    }

    #[test]
    fn test_bloom_resolution_never_zero() {
        assert_eq!(bloom_resolution(1, 0), (1, 1));
    }

    #[test]
    fn test_light_colour_scaling() {
        let c = Color::rgb(1.0, 0.5, 0.0);
        assert_eq!(rgb_scaled(c, 2.0), [2.0, 1.0, 0.0]);
        assert_eq!(rgb(c), [1.0, 0.5, 0.0]);
    }
}
