//! Vertex data parsers
//!
//! Three source formats are understood:
//! - C/C++ headers embedding a named float array (`const float cube[] = { ... };`),
//!   six floats per vertex (position, normal)
//! - plain text with one vertex per line, 3, 6 or 8 floats
//! - Wavefront OBJ via `tobj`, always eight floats per vertex

use std::path::Path;

use super::AssetError;

/// Parsed, immutable vertex data
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    vertices: Vec<f32>,
    vertex_count: usize,
    stride: usize,
}

impl ModelData {
    /// Wrap interleaved vertices of `stride` floats each
    ///
    /// Fails if the buffer does not hold a whole number of vertices.
    pub fn new(vertices: Vec<f32>, stride: usize) -> Result<Self, AssetError> {
        if stride == 0 || vertices.len() % stride != 0 {
            return Err(AssetError::Parse {
                path: String::new(),
                reason: format!("{} floats is not a multiple of stride {}", vertices.len(), stride),
            });
        }

        Ok(Self {
            vertex_count: vertices.len() / stride,
            vertices,
            stride,
        })
    }

    /// Interleaved floats
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Number of vertices
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Floats per vertex
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// True when there are no vertices
    pub const fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Size of the vertex buffer in bytes
    pub fn byte_size(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }
}

/// Source format parsers used by [`ModelCache`](super::ModelCache)
pub trait ModelParser: Send + Sync {
    /// Parse the float array `array` embedded in a header file
    fn parse_header(&self, path: &Path, array: &str) -> Result<ModelData, AssetError>;

    /// Parse a one-vertex-per-line text file
    fn parse_text(&self, path: &Path) -> Result<ModelData, AssetError>;

    /// Parse a Wavefront OBJ file
    fn parse_obj(&self, path: &Path) -> Result<ModelData, AssetError>;
}

/// Floats per vertex in header arrays
pub const HEADER_STRIDE: usize = 6;

/// Floats per vertex produced from OBJ files
pub const OBJ_STRIDE: usize = 8;

/// Default parser set
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelLoader;

impl ModelLoader {
    /// Create a loader
    pub const fn new() -> Self {
        Self
    }

    fn read_file(path: &Path) -> Result<String, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    /// Extract the float array `array` from C-style source text
    pub fn parse_float_array(content: &str, array: &str) -> Option<Vec<f32>> {
        let start = find_array_declaration(content, array)?;
        let open = start + content[start..].find('{')?;
        let close = open + content[open..].find('}')?;

        let values = content[open + 1..close]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .filter_map(|token| match parse_float(token) {
                Some(value) => Some(value),
                None => {
                    log::warn!("Could not parse '{}' as float in array '{}'", token, array);
                    None
                }
            })
            .collect();

        Some(values)
    }

    /// Parse one-vertex-per-line text
    ///
    /// `#` and `//` start comments. The first data line fixes the stride,
    /// which must be 3, 6 or 8; every later line must match it.
    pub fn parse_vertex_text(content: &str) -> Result<ModelData, String> {
        let mut vertices = Vec::new();
        let mut stride = None;

        for (number, line) in content.lines().enumerate() {
            let data = strip_comment(line).trim();
            if data.is_empty() {
                continue;
            }

            let values = data
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(|token| parse_float(token).ok_or_else(|| format!("line {}: bad float '{}'", number + 1, token)))
                .collect::<Result<Vec<f32>, String>>()?;

            match stride {
                None => {
                    if !matches!(values.len(), 3 | 6 | 8) {
                        return Err(format!(
                            "line {}: {} floats per vertex, expected 3, 6 or 8",
                            number + 1,
                            values.len()
                        ));
                    }
                    stride = Some(values.len());
                }
                Some(expected) if expected != values.len() => {
                    return Err(format!(
                        "line {}: {} floats, previous lines had {}",
                        number + 1,
                        values.len(),
                        expected
                    ));
                }
                Some(_) => {}
            }

            vertices.extend(values);
        }

        ModelData::new(vertices, stride.unwrap_or(3)).map_err(|e| e.to_string())
    }
}

impl ModelParser for ModelLoader {
    fn parse_header(&self, path: &Path, array: &str) -> Result<ModelData, AssetError> {
        let content = Self::read_file(path)?;
        let mut values = Self::parse_float_array(&content, array).ok_or_else(|| AssetError::Parse {
            path: path.display().to_string(),
            reason: format!("array '{array}' not found"),
        })?;

        let remainder = values.len() % HEADER_STRIDE;
        if remainder != 0 {
            log::warn!(
                "Array '{}' in {} has {} floats, not divisible by {}; dropping the last {}",
                array,
                path.display(),
                values.len(),
                HEADER_STRIDE,
                remainder
            );
            values.truncate(values.len() - remainder);
        }

        if values.is_empty() {
            return Err(AssetError::Empty(format!("{}#{}", path.display(), array)));
        }

        log::debug!("Loaded array '{}': {} floats", array, values.len());
        ModelData::new(values, HEADER_STRIDE)
    }

    fn parse_text(&self, path: &Path) -> Result<ModelData, AssetError> {
        let content = Self::read_file(path)?;
        let data = Self::parse_vertex_text(&content).map_err(|reason| AssetError::Parse {
            path: path.display().to_string(),
            reason,
        })?;

        if data.is_empty() {
            return Err(AssetError::Empty(path.display().to_string()));
        }
        Ok(data)
    }

    fn parse_obj(&self, path: &Path) -> Result<ModelData, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }

        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let mut vertices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_texcoords = mesh.texcoords.len() / 2 == mesh.positions.len() / 3;

            for &index in &mesh.indices {
                let i = index as usize;
                let position = mesh.positions.get(3 * i..3 * i + 3).ok_or_else(|| AssetError::Parse {
                    path: path.display().to_string(),
                    reason: format!("index {i} out of range in mesh '{}'", model.name),
                })?;
                vertices.extend_from_slice(position);

                match has_normals.then(|| mesh.normals.get(3 * i..3 * i + 3)).flatten() {
                    Some(normal) => vertices.extend_from_slice(normal),
                    None => vertices.extend_from_slice(&[0.0; 3]),
                }

                match has_texcoords.then(|| mesh.texcoords.get(2 * i..2 * i + 2)).flatten() {
                    Some(uv) => vertices.extend_from_slice(uv),
                    None => vertices.extend_from_slice(&[0.0; 2]),
                }
            }
        }

        if vertices.is_empty() {
            return Err(AssetError::Empty(path.display().to_string()));
        }

        log::debug!("Loaded OBJ {}: {} meshes, {} vertices", path.display(), models.len(), vertices.len() / OBJ_STRIDE);
        ModelData::new(vertices, OBJ_STRIDE)
    }
}

/// Byte offset of `name` declared as an array (`name[...]` or `name = {`)
fn find_array_declaration(content: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    content.match_indices(name).map(|(start, _)| start).find(|&start| {
        let before_ok = content[..start].chars().next_back().map_or(true, |c| !is_ident(c));
        let rest = &content[start + name.len()..];
        let after_ok = rest.chars().next().map_or(false, |c| !is_ident(c));
        let declares = matches!(rest.trim_start().chars().next(), Some('[' | '='));
        before_ok && after_ok && declares
    })
}

fn strip_comment(line: &str) -> &str {
    let cut = [line.find('#'), line.find("//")].into_iter().flatten().min();
    cut.map_or(line, |index| &line[..index])
}

fn parse_float(token: &str) -> Option<f32> {
    let token = token.trim_end_matches(['f', 'F']);
    token.parse().ok()
}
