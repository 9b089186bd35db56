#![cfg(feature = "integration-tests")]

mod common;

use alpaca_viewer::{
    command::Command,
    customize::{ColorSlot, hex_to_linear},
    data_structures::{model, skin},
    resources::{LoadedModel, ModelLayouts, asset::parse_gltf},
    viewer::ViewerState,
};

use crate::common::test_utils::embedded_gltf;

fn gpu() -> (wgpu::Device, wgpu::Queue) {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("a graphics adapter");
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("a device")
    })
}

fn upload(device: &wgpu::Device, queue: &wgpu::Queue) -> LoadedModel {
    let asset = futures::executor::block_on(parse_gltf(embedded_gltf().as_bytes(), "assets"))
        .expect("embedded asset parses");
    let material = model::material_layout(device);
    let skin = skin::skin_layout(device);
    let layouts = ModelLayouts {
        material: &material,
        skin: &skin,
    };
    LoadedModel::upload(asset, device, queue, layouts, 3)
}

fn rgb(model: &LoadedModel, name: &str) -> [f32; 3] {
    let [r, g, b, _] = model.sub_mesh_color(name).expect("sub-mesh exists");
    [r, g, b]
}

#[test]
fn should_recolour_the_uploaded_sub_mesh_bound_to_a_slot() {
    let (device, queue) = gpu();
    let mut model = upload(&device, &queue);
    let mut state = ViewerState::default();
    let untouched = rgb(&model, "Cube_2");

    state.apply(&Command::SetColor(ColorSlot::Hooves, 0xff0000), &mut model);

    assert_eq!(rgb(&model, "Cube_3"), hex_to_linear(0xff0000));
    assert_eq!(rgb(&model, "Cube_2"), untouched);
    assert_eq!(state.colors.current(ColorSlot::Hooves), 0xff0000);
}

#[test]
fn should_restore_every_uploaded_sub_mesh_on_reset() {
    let (device, queue) = gpu();
    let mut model = upload(&device, &queue);
    let mut state = ViewerState::default();
    state.apply(&Command::SetColor(ColorSlot::Hooves, 0xff0000), &mut model);
    state.apply(&Command::SetColor(ColorSlot::EyeLight, 0x00ff00), &mut model);

    state.apply(&Command::ResetColors, &mut model);

    for slot in ColorSlot::ALL {
        assert_eq!(
            rgb(&model, slot.mesh_name()),
            hex_to_linear(slot.default_hex()),
            "{:?}",
            slot
        );
    }
}
