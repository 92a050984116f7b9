//! Shared fixtures: small PDFs generated with lopdf, every page tagged
//! (`A1`, `A2`, ...) so merged page order can be read back.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

fn media_box() -> Object {
    Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()])
}

fn add_tagged_pages(doc: &mut Document, parent_id: ObjectId, tag: &str, page_count: usize) -> Vec<Object> {
    let mut kids = Vec::new();
    for i in 1..=page_count {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            format!("0 0 m {} {} l S", i * 10, i * 10).into_bytes(),
        ));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(parent_id));
        page.set("Contents", Object::Reference(content_id));
        page.set("Tag", Object::string_literal(format!("{}{}", tag, i)));
        kids.push(Object::Reference(doc.add_object(page)));
    }
    kids
}

fn finish(doc: &mut Document, pages_id: ObjectId) {
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
}

/// A flat document: one Pages node holding `page_count` tagged pages
pub fn build_pdf(tag: &str, page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids = add_tagged_pages(&mut doc, pages_id, tag, page_count);

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set("MediaBox", media_box());
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    finish(&mut doc, pages_id);
    doc
}

/// Pages sit under an intermediate node; MediaBox lives only on the root
pub fn build_nested_pdf(tag: &str, page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let middle_id = doc.new_object_id();
    let kids = add_tagged_pages(&mut doc, middle_id, tag, page_count);

    let mut middle = Dictionary::new();
    middle.set("Type", Object::Name(b"Pages".to_vec()));
    middle.set("Parent", Object::Reference(root_id));
    middle.set("Count", Object::Integer(kids.len() as i64));
    middle.set("Kids", Object::Array(kids));
    doc.objects.insert(middle_id, Object::Dictionary(middle));

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Pages".to_vec()));
    root.set("Count", Object::Integer(page_count as i64));
    root.set("Kids", Object::Array(vec![Object::Reference(middle_id)]));
    root.set("MediaBox", media_box());
    doc.objects.insert(root_id, Object::Dictionary(root));

    finish(&mut doc, root_id);
    doc
}

pub fn write_pdf(path: &Path, tag: &str, page_count: usize) {
    build_pdf(tag, page_count)
        .save(path)
        .expect("Failed to write fixture PDF");
}

/// Tags of every page in page order
pub fn page_tags(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).expect("page is not a dictionary");
            let tag = page.get(b"Tag").and_then(Object::as_str).expect("page has no tag");
            String::from_utf8_lossy(tag).into_owned()
        })
        .collect()
}

pub fn tags(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| s.to_string()).collect()
}
