//! Nebula3D scene demo.
//!
//! Builds a scene from three producer threads, drains on the main thread,
//! and prints the resulting spatial partitioning. No renderer attached:
//! the demo stops where a renderer would take over.

use std::thread;

use glam::Vec3;

use nebula_3d_scene::nebula3d::scene::{
    Camera, Light, OrbitAnimation, Scene, SceneConfig, SceneObject,
};

fn main() {
    let mut scene = Scene::new(SceneConfig::default());

    // The owner sets up an anchor region and a camera to render from.
    let queue = scene.queue();
    let camera = queue.add_camera(Camera::new(Vec3::new(0.0, 30.0, 80.0), Vec3::ZERO));
    queue.switch_camera(camera);
    queue.add_light(Light::directional(Vec3::new(-0.3, -1.0, -0.2), Vec3::ONE));
    let anchor = queue.add_object(SceneObject::with_box(Vec3::ZERO, Vec3::splat(30.0)));

    // Three producer threads populate the scene concurrently.
    let producers: Vec<_> = (0..3)
        .map(|p| {
            let queue = scene.queue();
            thread::spawn(move || {
                for i in 0..20 {
                    let angle = (p * 20 + i) as f32 * 0.31;
                    let radius = 8.0 + (i as f32) * 2.5;
                    let position = Vec3::new(
                        angle.cos() * radius,
                        (i % 5) as f32 * 4.0 - 8.0,
                        angle.sin() * radius,
                    );
                    if i % 4 == 0 {
                        queue.add_object(SceneObject::with_sphere(position, 1.5));
                    } else {
                        queue.add_object(SceneObject::with_box(position, Vec3::splat(1.0)));
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer thread panicked");
    }

    // One drain applies everything the producers queued.
    scene.drain().expect("drain failed");
    println!(
        "scene holds {} objects, {} cameras, {} lights",
        scene.object_count(),
        scene.camera_count(),
        scene.light_count()
    );

    // Drive an orbit for a few ticks; the index follows the mover.
    scene
        .queue()
        .add_animation(Box::new(OrbitAnimation::new(anchor, Vec3::ZERO, 45.0, 0.8)));
    scene.drain().expect("drain failed");
    for _ in 0..5 {
        scene.advance_animations(1.0 / 60.0);
    }

    // Show the partitioning the way a debug overlay would.
    println!("index regions:");
    scene.visit_index_regions(|bounds, depth| {
        println!(
            "{}[{:6.1} {:6.1} {:6.1}] .. [{:6.1} {:6.1} {:6.1}]",
            "  ".repeat(depth),
            bounds.min.x, bounds.min.y, bounds.min.z,
            bounds.max.x, bounds.max.y, bounds.max.z,
        );
    });

    if let Some(active) = scene.active_camera() {
        let vp = active.view_projection_matrix();
        println!("active camera view-projection row 0: {:?}", vp.row(0));
    }
}
