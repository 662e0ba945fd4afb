//! Render demo
//!
//! Builds a small scene (a triangle mesh and a set of slicing planes through a
//! volume), renders a few frames through the device's swap chain and logs a
//! checksum of every presented frame.
//!
//! An optional first argument names a `.toml` or `.ron` device configuration.

use ray_engine::foundation::logging;
use ray_engine::prelude::*;

const FRAME_COUNT: usize = 4;
const RESOLUTION: (u32, u32) = (64, 64);

fn load_config(path: Option<&str>) -> Result<DeviceConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(DeviceConfig::load_from_file(path)?),
        None => Ok(DeviceConfig::from_env()),
    }
}

fn data<T: bytemuck::Pod>(device: &mut Device, format: DataType, items: &[T]) -> DataHandle {
    device.create_data(items.len(), format, Some(bytemuck::cast_slice(items)), DataFlags::empty())
}

/// Create and commit the demo model
fn build_scene(device: &mut Device) -> DeviceResult<ModelHandle> {
    let model = device.create_model();

    let mesh = device.create_triangle_mesh();
    let vertex: [[f32; 3]; 4] = [[-1.0, -1.0, 4.0], [1.0, -1.0, 4.0], [1.0, 1.0, 4.0], [-1.0, 1.0, 4.0]];
    let index: [[i32; 3]; 2] = [[0, 1, 2], [0, 2, 3]];
    let color: [[f32; 4]; 4] = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0], [1.0, 1.0, 1.0, 1.0]];
    let vertex = data(device, DataType::Float3, &vertex);
    let index = data(device, DataType::Int3, &index);
    let color = data(device, DataType::Float4, &color);
    device.set_object(mesh, "vertex", vertex);
    device.set_object(mesh, "index", index);
    device.set_object(mesh, "vertex.color", color);
    device.commit(mesh)?;

    let volume = device.create_volume("structured");
    device.commit(volume)?;
    let slices = device.create_geometry("slices");
    let planes: [[f32; 4]; 3] = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, -5.0]];
    let planes = data(device, DataType::Float4, &planes);
    device.set_object(slices, "planes", planes);
    device.set_object(slices, "volume", volume);
    device.commit(slices)?;

    device.attach_geometry(model, mesh);
    device.attach_geometry(model, slices);
    device.commit(model)?;

    // The model keeps plain references; the buffers stay alive with the device.
    Ok(model)
}

fn checksum(pixels: &[u8]) -> u64 {
    pixels
        .iter()
        .fold(0xcbf2_9ce4_8422_2325, |hash, &byte| (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1);
    let config = load_config(path.as_deref())?;

    // Verbosity is fixed by the first install; init reads it.
    logging::install_verbosity(config.resolved_log_level());
    logging::init();
    if let Some(path) = &path {
        log::info!("Loaded device configuration from {}", path);
    }

    let depth = config.default_swap_chain_depth;
    let mut device = Device::new(config)?;
    log::info!("Render demo using the '{}' kernel", device.kernel_name());

    let fb = device.create_frame_buffer(Vec2u::new(RESOLUTION.0, RESOLUTION.1), FrameBufferMode::RgbaI8, depth);
    let model = build_scene(&mut device)?;

    let camera = device.create_camera("perspective");
    device.set_vec3f(camera, "pos", Vec3::zeros());
    device.set_vec3f(camera, "dir", Vec3::new(0.0, 0.0, 1.0));
    device.set_float(camera, "aspect", RESOLUTION.0 as f32 / RESOLUTION.1 as f32);
    device.commit(camera)?;

    let renderer = device.create_renderer("ray_cast");
    device.set_object(renderer, "model", model);
    device.set_object(renderer, "camera", camera);
    device.set_vec3f(renderer, "bgColor", Vec3::new(0.2, 0.3, 0.4));
    device.commit(renderer)?;

    for frame in 0..FRAME_COUNT {
        let token = device.render_frame(fb, renderer)?;
        device.present(token)?;

        let pixels = device.map_frame_buffer(fb)?;
        log::info!("Frame {}: {} bytes, checksum {:016x}", frame, pixels.len(), checksum(pixels));
        let mapped = pixels.as_ptr();
        device.unmap_frame_buffer(mapped, fb)?;
    }

    device.release(renderer);
    device.release(camera);
    device.release(model);
    device.release_frame_buffer(fb);
    log::info!("{} objects still alive", device.object_count());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Render demo failed: {}", e);
        eprintln!("Render demo failed: {}", e);
        std::process::exit(1);
    }
}
