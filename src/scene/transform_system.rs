//! 变换系统 (Transform System)
//!
//! 负责场景图的矩阵层级更新：从每个场景根节点深度优先遍历，
//! `world(child) = world(parent) · local(child)`。
//! 只借用节点列表和根节点列表，不依赖整个资源容器。

use glam::Mat4;

use crate::scene::node::Node;

/// 更新整个场景层级的世界矩阵（显式栈，避免深层级场景的栈溢出）
///
/// 只有局部矩阵变化或父节点世界矩阵变化的节点才会重新计算。
/// 设置 `force` 时整棵树都会重新计算（例如切换场景后）。
pub fn update_hierarchy(nodes: &mut [Node], roots: &[usize], force: bool) {
    // 工作栈：(节点索引, 父世界矩阵, 父是否变化)
    let mut stack: Vec<(usize, Mat4, bool)> = Vec::with_capacity(64);
    let mut visited = vec![false; nodes.len()];

    for &root in roots.iter().rev() {
        stack.push((root, Mat4::IDENTITY, force));
    }

    while let Some((index, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(index) else {
            log::warn!("Scene references missing node {index}");
            continue;
        };
        if std::mem::replace(&mut visited[index], true) {
            log::warn!("Node {index} reached twice during one walk, ignoring");
            continue;
        }

        // 1. 更新局部矩阵
        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        // 2. 更新世界矩阵（同时派生逆矩阵和法线矩阵）
        if world_needs_update {
            node.set_world_matrix(parent_world * node.transform.local_matrix_as_mat4());
        }

        // 3. 子节点逆序入栈以保持文档顺序
        let current_world = node.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, current_world, world_needs_update));
        }
    }
}
