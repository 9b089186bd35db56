use alpaca_viewer::{
    animation::{AnimationSelector, Interpolation, Keyframes},
    resources::asset::{NameRegistry, decode_data_uri, parse_gltf, sanitize_name},
};

mod common;

use crate::common::test_utils::{alpaca_like_gltf, buffer, embedded_gltf};

#[test]
fn should_name_primitives_uniquely_in_load_order() {
    let asset = futures::executor::block_on(parse_gltf(embedded_gltf().as_bytes(), "assets"))
        .expect("embedded asset parses");
    // The single primitive of "Extra" is named after its node.
    let expected: Vec<String> = std::iter::once("Cube".to_string())
        .chain((1..8).map(|i| format!("Cube_{}", i)))
        .chain(std::iter::once("Extra".to_string()))
        .collect();
    assert_eq!(asset.sub_mesh_names(), expected);
}

#[test]
fn should_share_one_namespace_between_nodes_and_meshes() {
    let gltf = embedded_gltf().replace(r#""name": "Alpaca""#, r#""name": "Cube""#);
    let asset = futures::executor::block_on(parse_gltf(gltf.as_bytes(), "assets"))
        .expect("embedded asset parses");
    assert_eq!(asset.roots[0].children[0].name.as_deref(), Some("Cube"));
    let expected: Vec<String> = (1..9)
        .map(|i| format!("Cube_{}", i))
        .chain(std::iter::once("Extra".to_string()))
        .collect();
    assert_eq!(asset.sub_mesh_names(), expected);
}

#[test]
fn should_fail_when_an_image_view_runs_past_its_buffer() {
    // The buffer holds 76 bytes, the image view claims 100 starting at 60.
    let gltf = embedded_gltf()
        .replace(
            r#""bufferViews": ["#,
            r#""images": [{"bufferView": 4, "mimeType": "image/png"}],
  "bufferViews": ["#,
        )
        .replace(
            r#"{"buffer": 0, "byteOffset": 52, "byteLength": 24}"#,
            r#"{"buffer": 0, "byteOffset": 52, "byteLength": 24},
    {"buffer": 0, "byteOffset": 60, "byteLength": 100}"#,
        );

    let result = futures::executor::block_on(parse_gltf(gltf.as_bytes(), "assets"));
    let message = format!("{:#}", result.expect_err("view is out of range"));
    assert!(message.contains("image 0"), "{}", message);
}

#[test]
fn should_keep_the_node_hierarchy_and_transforms() {
    let asset = futures::executor::block_on(parse_gltf(embedded_gltf().as_bytes(), "assets"))
        .expect("embedded asset parses");
    assert_eq!(asset.roots.len(), 2);
    let root = &asset.roots[0];
    assert_eq!(root.index, 1);
    assert_eq!(root.name.as_deref(), Some("Root"));
    assert!(root.sub_meshes.is_empty());

    let alpaca = &root.children[0];
    assert_eq!(alpaca.index, 0);
    assert_eq!(alpaca.transform.position.y, 1.0);
    assert_eq!(alpaca.sub_meshes.len(), 8);
    for sub_mesh in &alpaca.sub_meshes {
        assert_eq!(sub_mesh.vertices.len(), 3);
        assert_eq!(sub_mesh.indices, vec![0, 1, 2]);
        assert_eq!(sub_mesh.material, Some(0));
        assert_eq!(sub_mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    }
    assert_eq!(asset.materials[0].base_color, [0.5, 0.25, 0.125, 1.0]);
    assert_eq!(asset.materials[0].base_color_image, None);
}

#[test]
fn should_read_clips_in_file_order() {
    let asset = futures::executor::block_on(parse_gltf(embedded_gltf().as_bytes(), "assets"))
        .expect("embedded asset parses");
    assert_eq!(asset.clip_names(), vec!["Walk", "Idle"]);

    let walk = &asset.clips[0];
    assert_eq!(walk.duration, 1.0);
    assert_eq!(walk.channels.len(), 1);
    assert_eq!(walk.channels[0].node, 0);
    assert!(matches!(walk.channels[0].interpolation, Interpolation::Linear));
    assert!(matches!(&walk.channels[0].keyframes, Keyframes::Translation(v) if v.len() == 2));
    assert!(matches!(asset.clips[1].channels[0].interpolation, Interpolation::Step));

    let selector = AnimationSelector::new(asset.clips);
    assert_eq!(selector.active_clip(), Some("Walk"));
}

#[test]
fn should_fail_on_malformed_documents() {
    let result = futures::executor::block_on(parse_gltf(b"{ not a gltf", "assets"));
    assert!(result.is_err());
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn should_fail_when_an_external_buffer_is_missing() {
    let gltf = alpaca_like_gltf("missing.bin", buffer().len());
    let result = futures::executor::block_on(parse_gltf(gltf.as_bytes(), "does/not/exist"));
    let message = format!("{:#}", result.expect_err("buffer file does not exist"));
    assert!(message.contains("missing.bin"), "{}", message);
}

#[test]
fn should_decode_base64_data_uris() {
    let (mime, bytes) = decode_data_uri("data:image/png;base64,AAEC")
        .expect("is a data URI")
        .expect("valid base64");
    assert_eq!(mime.as_deref(), Some("image/png"));
    assert_eq!(bytes, vec![0, 1, 2]);

    assert!(decode_data_uri("textures/grass.jpg").is_none());
    assert!(matches!(decode_data_uri("data:text/plain,hello"), Some(Err(_))));
    assert!(matches!(decode_data_uri("data:;base64,@@@"), Some(Err(_))));
}

#[test]
fn should_hand_out_suffixed_names() {
    let mut names = NameRegistry::default();
    assert_eq!(names.unique("Cube"), "Cube");
    assert_eq!(names.unique("Cube"), "Cube_1");
    assert_eq!(names.unique("Eye Left"), "Eye_Left");
    assert_eq!(names.unique("Cube"), "Cube_2");
    assert_eq!(sanitize_name("Armature.001/Bone[0]"), "Armature001Bone0");
}
