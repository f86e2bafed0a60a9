use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};

/// Transform 组件
///
/// 封装了节点的平移、旋转、缩放（TRS）以及局部矩阵缓存和脏检查逻辑。
/// glTF 节点既可以直接给出矩阵，也可以给出 TRS；给出矩阵时会分解回 TRS，
/// 但在 TRS 被修改之前，局部矩阵保持为原始矩阵。
#[derive(Debug, Clone)]
pub struct Transform {
    // === Public 属性 ===
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    // === 矩阵缓存 ===
    pub(crate) local_matrix: Affine3A,

    // === 脏检查状态 ===
    last_translation: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,

            last_translation: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            ..Self::new()
        }
    }

    /// 由矩阵构造（会分解出 TRS）
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let mut transform = Self::new();
        transform.apply_matrix(matrix);
        transform
    }

    // ========================================================================
    // 核心逻辑：脏检查更新
    // ========================================================================

    /// 检查并更新局部矩阵
    /// 返回值: 是否发生了变化
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.translation != self.last_translation
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale;

        if changed {
            self.local_matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation);

            self.last_translation = self.translation;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
        }

        let changed = changed || self.force_update;
        self.force_update = false;
        changed
    }

    /// 直接设置局部矩阵（glTF `matrix` 属性）
    ///
    /// 分解规则：平移取最后一列，缩放取前三列的长度，旋转取归一化后的基。
    /// 行列式为负（镜像）时 x 轴缩放取负，使旋转保持为正交旋转。
    /// 切变信息会丢失，但局部矩阵本身保持原样直到 TRS 被修改。
    pub fn apply_matrix(&mut self, matrix: Mat4) {
        let (scale, rotation, translation) = decompose(&matrix);

        self.local_matrix = Affine3A::from_mat4(matrix);
        self.scale = scale;
        self.rotation = rotation;
        self.translation = translation;

        self.last_scale = scale;
        self.last_rotation = rotation;
        self.last_translation = translation;

        self.mark_dirty();
    }

    /// 获取局部矩阵
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn local_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.local_matrix)
    }

    /// 手动标记脏（例如用于强制刷新）
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

fn decompose(matrix: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = matrix.w_axis.truncate();
    let basis = Mat3::from_mat4(*matrix);

    let mut scale = Vec3::new(
        basis.x_axis.length(),
        basis.y_axis.length(),
        basis.z_axis.length(),
    );
    if basis.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    if scale.x == 0.0 || scale.y == 0.0 || scale.z == 0.0 {
        return (scale, Quat::IDENTITY, translation);
    }

    let rotation = Mat3::from_cols(
        basis.x_axis / scale.x,
        basis.y_axis / scale.y,
        basis.z_axis / scale.z,
    );
    let rotation = Quat::from_mat3(&rotation).normalize();
    (scale, rotation, translation)
}
