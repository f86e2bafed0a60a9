//! Scene graph tests
//!
//! Tests for:
//! - Transform TRS dirty checking and matrix decomposition
//! - Hierarchical world-matrix propagation
//! - Singular matrix fallbacks
//! - Scene traversal (gather / includes)
//! - Skin joint matrices

mod common;

use common::approx_eq;
use glam::{Mat3, Mat4, Quat, Vec3};
use lumen::resources::{AccessorData, Mesh};
use lumen::scene::{Node, Scene, Skin, Transform, update_hierarchy};
use std::f32::consts::FRAC_PI_2;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn node_at(translation: Vec3, children: Vec<usize>) -> Node {
    let mut node = Node::new();
    node.transform.translation = translation;
    node.children = children;
    node
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.translation, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
}

#[test]
fn local_matrix_is_recomputed_only_on_change() {
    let mut t = Transform::new();
    assert!(t.update_local_matrix(), "first update is forced");
    assert!(!t.update_local_matrix());

    t.translation = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());
    assert!(vec3_approx(t.local_matrix().translation.into(), Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn matrix_node_keeps_authored_local_matrix() {
    let rotation = Quat::from_rotation_y(FRAC_PI_2);
    let matrix = Mat4::from_scale_rotation_translation(Vec3::new(2.0, 3.0, 4.0), rotation, Vec3::new(5.0, 6.0, 7.0));
    let mut t = Transform::from_matrix(matrix);

    assert!(t.update_local_matrix(), "a supplied matrix marks the transform dirty");
    assert!(t.local_matrix_as_mat4().abs_diff_eq(matrix, 1e-5));
    assert!(approx_eq(t.rotation.length(), 1.0));
}

#[test]
fn mirrored_matrix_keeps_a_proper_rotation() {
    let matrix = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
    let t = Transform::from_matrix(matrix);

    assert!(approx_eq(t.scale.x, -1.0));
    assert!(t.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn child_world_composes_parent_translation() {
    let mut nodes = vec![node_at(Vec3::X, vec![1]), node_at(Vec3::Y, vec![])];
    update_hierarchy(&mut nodes, &[0], true);

    let origin = nodes[1].world_matrix().transform_point3(Vec3::ZERO);
    assert!(vec3_approx(origin, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn parent_change_propagates_to_children() {
    let mut nodes = vec![node_at(Vec3::X, vec![1]), node_at(Vec3::Y, vec![])];
    update_hierarchy(&mut nodes, &[0], true);

    nodes[0].transform.translation = Vec3::new(0.0, 0.0, 5.0);
    update_hierarchy(&mut nodes, &[0], false);
    assert!(vec3_approx(nodes[1].world_translation(), Vec3::new(0.0, 1.0, 5.0)));
}

#[test]
fn inverse_and_normal_matrices_follow_world() {
    let mut nodes = vec![Node::new()];
    nodes[0].transform.scale = Vec3::new(2.0, 1.0, 1.0);
    update_hierarchy(&mut nodes, &[0], true);

    let node = &nodes[0];
    let product = node.world_matrix() * node.inverse_world_matrix();
    assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    assert!(node.normal_matrix().abs_diff_eq(node.inverse_world_matrix().transpose(), 1e-6));
}

#[test]
fn singular_world_matrix_falls_back_to_identity() {
    let mut nodes = vec![Node::new()];
    nodes[0].transform.scale = Vec3::new(1.0, 0.0, 1.0);
    update_hierarchy(&mut nodes, &[0], true);

    assert!(!nodes[0].is_invertible());
    assert_eq!(nodes[0].inverse_world_matrix(), Mat4::IDENTITY);
    assert_eq!(nodes[0].normal_matrix(), Mat4::IDENTITY);
}

#[test]
fn cyclic_graph_does_not_hang() {
    let mut nodes = vec![node_at(Vec3::X, vec![1]), node_at(Vec3::Y, vec![0])];
    update_hierarchy(&mut nodes, &[0], true);
    assert!(vec3_approx(nodes[1].world_translation(), Vec3::new(1.0, 1.0, 0.0)));
}

// ============================================================================
// Scene traversal
// ============================================================================

#[test]
fn gather_visits_parents_before_children_in_document_order() {
    let nodes = vec![
        node_at(Vec3::ZERO, vec![2, 3]),
        node_at(Vec3::ZERO, vec![]),
        node_at(Vec3::ZERO, vec![]),
        node_at(Vec3::ZERO, vec![]),
        node_at(Vec3::ZERO, vec![]),
    ];
    let scene = Scene::new(vec![0, 1]);

    assert_eq!(scene.gather_nodes(&nodes), vec![0, 2, 3, 1]);
    assert!(scene.includes_node(&nodes, 3));
    assert!(!scene.includes_node(&nodes, 4));
}

#[test]
fn extents_without_meshes_are_empty() {
    let nodes = vec![Node::new()];
    let meshes: Vec<Mesh> = Vec::new();
    let extents = Scene::new(vec![0]).extents(&nodes, &meshes, &[]);
    assert!(extents.is_empty());
}

// ============================================================================
// Skin
// ============================================================================

#[test]
fn joint_matrix_is_relative_to_skinned_node() {
    // 0: skinned mesh node at x = 1, 1: joint at x = 3
    let mut nodes = vec![node_at(Vec3::X, vec![]), node_at(Vec3::new(3.0, 0.0, 0.0), vec![])];
    update_hierarchy(&mut nodes, &[0, 1], true);

    let mut skin = Skin::new(vec![1], None);
    let ibm = Mat4::from_translation(Vec3::new(-3.0, 0.0, 0.0));
    skin.load_inverse_bind_matrices(&AccessorData::F32(ibm.to_cols_array().to_vec()));

    let matrices = skin.compute_joint_matrices(&nodes, nodes[0].inverse_world_matrix());
    assert_eq!(matrices.joints.len(), 1);
    // inverse(world(mesh)) · world(joint) · ibm = translate(-1)
    let origin = matrices.joints[0].transform_point3(Vec3::ZERO);
    assert!(vec3_approx(origin, Vec3::new(-1.0, 0.0, 0.0)));
    // translation-only joints leave normals untouched
    assert!(Mat3::from_mat4(matrices.joint_normals[0]).abs_diff_eq(Mat3::IDENTITY, 1e-6));
}

#[test]
fn missing_joint_evaluates_to_identity() {
    let nodes = vec![Node::new()];
    let skin = Skin::new(vec![7], None);
    let matrices = skin.compute_joint_matrices(&nodes, Mat4::IDENTITY);
    assert_eq!(matrices.joints, vec![Mat4::IDENTITY]);
}
