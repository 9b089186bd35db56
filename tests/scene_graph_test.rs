use std::collections::HashMap;

use alpaca_viewer::{
    animation::{NodePose, Pose},
    data_structures::{
        ground::{PLANE_INDICES, plane_vertices},
        instance::{Instance, InstanceRaw},
        scene_graph::{ContainerNode, SceneNode},
        skin::joint_matrices,
    },
};
use cgmath::{Deg, InnerSpace, Matrix4, Quaternion, Rotation3, SquareMatrix, Vector3};

fn armature() -> ContainerNode {
    let mut root = ContainerNode::new(
        Some(0),
        Some("Armature".to_string()),
        Vector3::new(0.0, 1.0, 0.0).into(),
    );
    let mut spine = ContainerNode::new(
        Some(1),
        Some("Spine".to_string()),
        Vector3::new(0.0, 2.0, 0.0).into(),
    );
    spine.add_child(Box::new(ContainerNode::new(
        Some(2),
        Some("Head".to_string()),
        Vector3::new(0.0, 0.0, 1.0).into(),
    )));
    root.add_child(Box::new(spine));
    root
}

fn world_positions(root: &dyn SceneNode) -> HashMap<usize, Vector3<f32>> {
    let mut matrices = HashMap::new();
    root.collect_world_matrices(&mut matrices);
    matrices
        .into_iter()
        .map(|(idx, m)| (idx, m.w.truncate()))
        .collect()
}

#[test]
fn should_compose_world_transforms_down_the_tree() {
    let mut root = armature();
    root.update_world_transform_all();
    let positions = world_positions(&root);
    assert_eq!(positions[&0], Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(positions[&1], Vector3::new(0.0, 3.0, 0.0));
    assert_eq!(positions[&2], Vector3::new(0.0, 3.0, 1.0));
}

#[test]
fn should_keep_the_shear_of_a_rotated_child_under_non_uniform_scale() {
    let stretched = Instance {
        scale: Vector3::new(2.0, 1.0, 1.0),
        ..Instance::new()
    };
    let turned = Instance {
        rotation: Quaternion::from_angle_z(Deg(45.0)),
        ..Instance::new()
    };
    let mut root = ContainerNode::new(Some(0), None, stretched);
    root.add_child(Box::new(ContainerNode::new(Some(1), None, turned)));
    root.update_world_transform_all();

    let mut matrices = HashMap::new();
    root.collect_world_matrices(&mut matrices);
    let world = matrices[&1];
    let expected = stretched.to_matrix() * turned.to_matrix();
    for (got, want) in [world.x, world.y, world.z, world.w]
        .into_iter()
        .zip([expected.x, expected.y, expected.z, expected.w])
    {
        assert!((got - want).magnitude() < 1e-5, "{:?} != {:?}", got, want);
    }
    // the child's local axes are no longer perpendicular in world space
    assert!(world.x.truncate().dot(world.y.truncate()).abs() > 0.1);
}

#[test]
fn should_keep_normals_perpendicular_under_non_uniform_scale() {
    let world = Instance {
        rotation: Quaternion::from_angle_y(Deg(30.0)),
        scale: Vector3::new(3.0, 1.0, 0.5),
        ..Instance::new()
    }
    .to_matrix();
    let raw = InstanceRaw::from_world(&world);
    assert_eq!(raw.model(), world);

    // a surface spanned by (1, 1, 0) and (0, 0, 1) has the normal (1, -1, 0)
    let tangents = [Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)];
    let normal = raw.normal() * Vector3::new(1.0, -1.0, 0.0);
    for tangent in tangents {
        let tangent = (world * tangent.extend(0.0)).truncate();
        assert!(normal.dot(tangent).abs() < 1e-5);
    }
}

#[test]
fn should_apply_poses_on_top_of_the_rest_pose() {
    let mut root = armature();
    let mut pose = Pose::new();
    pose.insert(
        1,
        NodePose {
            translation: Some(Vector3::new(5.0, 0.0, 0.0)),
            ..Default::default()
        },
    );
    root.apply_pose(&pose);
    root.update_world_transform_all();
    assert_eq!(world_positions(&root)[&2], Vector3::new(5.0, 1.0, 1.0));

    // nodes not in the next pose fall back to their rest transform
    root.apply_pose(&Pose::new());
    root.update_world_transform_all();
    assert_eq!(world_positions(&root)[&2], Vector3::new(0.0, 3.0, 1.0));
    assert_eq!(root.get_local_transform(), root.rest_transform());
}

#[test]
fn should_skin_relative_to_the_mesh() {
    let joints = [1, 2, 7];
    let bind = Matrix4::from_translation(Vector3::new(0.0, -3.0, 0.0));
    let mut world = HashMap::new();
    world.insert(1, Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0)));
    world.insert(2, Matrix4::from_translation(Vector3::new(1.0, 3.0, 0.0)));
    let mesh_world = Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0));

    let palette = joint_matrices(&joints, &[bind, bind], &mesh_world, &world);

    assert_eq!(palette.len(), 3);
    let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
    let moved: [[f32; 4]; 4] = Matrix4::from_translation(Vector3::new(0.0, -1.0, 0.0)).into();
    assert_eq!(palette[0], moved);
    assert_eq!(palette[1][3], [1.0, -1.0, 0.0, 1.0]);
    // joint 7 is not part of the scene
    assert_eq!(palette[2], identity);
}

#[test]
fn should_tile_the_ground_texture() {
    let vertices = plane_vertices(100.0, 10.0);
    for vertex in &vertices {
        assert_eq!(vertex.position[1], 0.0);
        assert_eq!(vertex.position[0].abs(), 50.0);
        assert_eq!(vertex.position[2].abs(), 50.0);
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        assert!(vertex.tex_coords.iter().all(|&uv| uv == 0.0 || uv == 10.0));
    }
    assert_eq!(PLANE_INDICES.len(), 6);
    assert_eq!(Instance::default(), Instance::new());
}
