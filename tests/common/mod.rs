//! Fixture helpers shared by the integration tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use fbx_importer::tree::{Attribute, Element, binary};

fn put_array(out: &mut Vec<u8>, marker: u8, len: usize, bytes: &[u8], compress: bool) {
    out.push(marker);
    out.extend_from_slice(&(len as u32).to_le_bytes());
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        let packed = encoder.finish().unwrap();
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        out.extend_from_slice(&packed);
    } else {
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(bytes);
    }
}

fn put_attribute(out: &mut Vec<u8>, attribute: &Attribute) {
    match attribute {
        Attribute::Bool(v) => {
            out.push(b'C');
            out.push(u8::from(*v));
        }
        Attribute::I16(v) => {
            out.push(b'Y');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Attribute::I32(v) => {
            out.push(b'I');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Attribute::I64(v) => {
            out.push(b'L');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Attribute::F32(v) => {
            out.push(b'F');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Attribute::F64(v) => {
            out.push(b'D');
            out.extend_from_slice(&v.to_le_bytes());
        }
        Attribute::String(s) => {
            out.push(b'S');
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Attribute::Raw(bytes) => {
            out.push(b'R');
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        Attribute::BoolArray(v) => {
            let bytes: Vec<u8> = v.iter().map(|&b| u8::from(b)).collect();
            put_array(out, b'b', v.len(), &bytes, false);
        }
        Attribute::I32Array(v) => {
            let bytes: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            put_array(out, b'i', v.len(), &bytes, true);
        }
        Attribute::I64Array(v) => {
            let bytes: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            put_array(out, b'l', v.len(), &bytes, false);
        }
        Attribute::F32Array(v) => {
            let bytes: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            put_array(out, b'f', v.len(), &bytes, false);
        }
        Attribute::F64Array(v) => {
            let bytes: Vec<u8> = v.iter().flat_map(|x| x.to_le_bytes()).collect();
            put_array(out, b'd', v.len(), &bytes, true);
        }
    }
}

fn put_offset(out: &mut Vec<u8>, value: usize, wide: bool) {
    if wide {
        out.extend_from_slice(&(value as u64).to_le_bytes());
    } else {
        out.extend_from_slice(&(value as u32).to_le_bytes());
    }
}

fn patch_offset(out: &mut [u8], at: usize, value: usize, wide: bool) {
    if wide {
        out[at..at + 8].copy_from_slice(&(value as u64).to_le_bytes());
    } else {
        out[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }
}

fn put_element(out: &mut Vec<u8>, element: &Element, wide: bool) {
    let width = if wide { 8 } else { 4 };
    let start = out.len();
    put_offset(out, 0, wide);
    put_offset(out, element.attributes.len(), wide);
    put_offset(out, 0, wide);
    out.push(element.name.len() as u8);
    out.extend_from_slice(element.name.as_bytes());

    let properties = out.len();
    for attribute in &element.attributes {
        put_attribute(out, attribute);
    }
    let property_len = out.len() - properties;
    patch_offset(out, start + 2 * width, property_len, wide);

    for child in &element.children {
        put_element(out, child, wide);
    }
    if !element.children.is_empty() {
        out.extend(std::iter::repeat_n(0u8, 3 * width + 1));
    }
    let end = out.len();
    patch_offset(out, start, end, wide);
}

/// Serializes a decoded tree back into the binary syntax.
pub fn encode_binary(root: &Element, version: u32) -> Vec<u8> {
    let wide = version >= 7500;
    let mut out = binary::HEADER.to_vec();
    out.extend_from_slice(&version.to_le_bytes());
    for child in &root.children {
        put_element(&mut out, child, wide);
    }
    out.extend(std::iter::repeat_n(0u8, if wide { 25 } else { 13 }));
    out
}
