//! Shared fixtures for integration tests: zip payloads, catalog pages, and
//! mock catalog wiring.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use subscout_core::download::FetchConfig;
use subscout_core::{CatalogClient, HttpClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;

/// Media type the catalog serves zip archives with.
pub const ZIP: &str = "application/x-zip-compressed";

/// Builds an in-memory zip archive from `(name, contents)` pairs.
///
/// Names ending in `/` become directory entries.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, FileOptions::default())
                .expect("add directory");
        } else {
            writer
                .start_file(*name, FileOptions::default())
                .expect("start file");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Catalog client pointed at a mock server, with pacing disabled.
pub fn catalog_for(server: &MockServer) -> CatalogClient {
    let config = FetchConfig {
        base_url: server.uri(),
        rate_limit: std::time::Duration::ZERO,
        ..FetchConfig::default()
    };
    let http = HttpClient::from_config(&config).expect("build http client");
    CatalogClient::new(http, &config).expect("build catalog client")
}

/// Search results page listing `(href, title, count)` rows.
pub fn search_page(rows: &[(&str, &str, u32)]) -> String {
    let items: String = rows
        .iter()
        .map(|(href, title, count)| {
            format!(
                r#"<li><div class="title"><a href="{href}">{title}</a></div><div class="count">{count} subtitles</div></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="search-result"><ul>{items}</ul></div></body></html>"#)
}

/// Subtitle listing page with `(href, title, hearing_impaired)` rows.
pub fn listing_page(rows: &[(&str, &str, bool)]) -> String {
    let items: String = rows
        .iter()
        .map(|(href, title, hi)| {
            let hi_cell = if *hi { r#"<td class="a41"></td>"# } else { r#"<td class="a40"></td>"# };
            format!(
                r#"<tr><td class="a1"><a href="{href}"><span>lang</span><span>{title}</span></a></td>{hi_cell}<td class="a5">uploader</td><td class="a6">comment</td></tr>"#
            )
        })
        .collect();
    format!(r#"<html><body><table><tbody>{items}</tbody></table></body></html>"#)
}

/// Subtitle detail page, with or without a download link.
pub fn detail_page(download_href: Option<&str>) -> String {
    match download_href {
        Some(href) => format!(
            r#"<html><body><div class="download"><a href="{href}">Download</a></div></body></html>"#
        ),
        None => "<html><body><p>removed</p></body></html>".to_string(),
    }
}

/// Mounts a detail page at `detail_path` linking to `/subtitle/download?mac=<id>`,
/// and the zip archive served there.
pub async fn mount_subtitle(server: &MockServer, detail_path: &str, id: &str, archive: Vec<u8>) {
    let href = format!("/subtitle/download?mac={id}");
    Mock::given(method("GET"))
        .and(path(detail_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(detail_page(Some(&href)), "text/html"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subtitle/download"))
        .and(query_param("mac", id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(archive, ZIP)
                .insert_header(
                    "Content-Disposition",
                    format!(r#"attachment; filename="subtitle-{id}.zip""#).as_str(),
                ),
        )
        .mount(server)
        .await;
}
