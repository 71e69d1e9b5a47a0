//! Wavefront OBJ export of species templates.

use anyhow::{Context, Result};
use flora_plugin::MeshData;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `objects` as named OBJ groups into one file.
pub fn write_obj_file(path: &Path, objects: &[(&str, &MeshData)]) -> Result<()> {
	let file =
		File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
	let mut writer = BufWriter::new(file);
	write_obj(&mut writer, objects)?;
	writer
		.flush()
		.with_context(|| format!("Failed to write: {}", path.display()))?;
	Ok(())
}

/// Write `objects` to `out`. Indices are 1-based and offset per object.
pub fn write_obj(out: &mut impl Write, objects: &[(&str, &MeshData)]) -> Result<()> {
	let mut offset = 1u32;
	for (name, mesh) in objects {
		writeln!(out, "o {name}")?;
		for p in &mesh.positions {
			writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
		}
		for n in &mesh.normals {
			writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
		}
		for uv in &mesh.uvs {
			writeln!(out, "vt {} {}", uv[0], uv[1])?;
		}
		for tri in mesh.indices.chunks_exact(3) {
			let [a, b, c] = [tri[0] + offset, tri[1] + offset, tri[2] + offset];
			writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
		}
		offset += mesh.vertex_count() as u32;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::Vec3;

	fn triangle() -> MeshData {
		let mut mesh = MeshData::new();
		let a = mesh.push_vertex(Vec3::ZERO, Vec3::Z, [0.0, 0.0]);
		let b = mesh.push_vertex(Vec3::X, Vec3::Z, [1.0, 0.0]);
		let c = mesh.push_vertex(Vec3::Y, Vec3::Z, [0.0, 1.0]);
		mesh.push_triangle(a, b, c);
		mesh
	}

	#[test]
	fn test_indices_offset_per_object() {
		let mesh = triangle();
		let mut out = Vec::new();
		write_obj(&mut out, &[("a", &mesh), ("b", &mesh)]).unwrap();
		let text = String::from_utf8(out).unwrap();

		let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
		assert_eq!(faces, vec!["f 1/1/1 2/2/2 3/3/3", "f 4/4/4 5/5/5 6/6/6"]);
		assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
		assert!(text.starts_with("o a\n"));
	}

	#[test]
	fn test_empty_mesh() {
		let mut out = Vec::new();
		write_obj(&mut out, &[("empty", &MeshData::new())]).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "o empty\n");
	}
}
