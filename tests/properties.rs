//! Property tests for URL decomposition, collection persistence and
//! placeholder substitution

use std::collections::HashMap;

use proptest::prelude::*;

use gopherman::model::{
    Body, Collection, Header, Item, Request, Response, Url, HEADER_TYPE_TEXT, MODE_RAW,
};
use gopherman::template::substitute;

fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}"
}

fn header() -> impl Strategy<Value = Header> {
    // Few keys, so repeated entries are common
    (prop::sample::select(vec!["accept", "x-trace", "cookie"]), "[ -~]{0,12}").prop_map(
        |(key, value)| Header {
            key: key.to_string(),
            name: key.to_string(),
            value,
            kind: HEADER_TYPE_TEXT.to_string(),
        },
    )
}

fn item() -> impl Strategy<Value = Item> {
    (
        prop::sample::select(vec!["GET", "POST", "PUT", "DELETE"]),
        prop::collection::vec(label(), 0..4),
        prop::collection::vec(header(), 0..6),
        prop::option::of(".{1,24}"),
        prop::option::of((".{1,24}", 100u16..600)),
    )
        .prop_map(|(method, segments, header, body, response)| {
            let path = format!("/{}", segments.join("/"));
            let request = Request {
                method: method.to_string(),
                header,
                body: body.map(|raw| Body {
                    mode: MODE_RAW.to_string(),
                    raw,
                }),
                url: Url::from_raw(&format!("http://localhost:3000{path}")),
            };
            let response = response.map(|(raw, status)| Response::raw(raw.as_bytes(), status));
            Item::recorded(&path, request, response)
        })
}

proptest! {
    #[test]
    fn url_decomposes_host_port_and_path(
        host in prop::collection::vec(label(), 1..4),
        port in 1u16..,
        path in prop::collection::vec(label(), 0..5),
    ) {
        let raw = format!("http://{}:{port}/{}", host.join("."), path.join("/"));
        let url = Url::from_raw(&raw);

        prop_assert_eq!(&url.raw, &raw);
        prop_assert_eq!(&url.host, &host);
        prop_assert_eq!(url.port, port.to_string());
        prop_assert_eq!(&url.path, &path);
    }

    #[test]
    fn collection_survives_persistence(
        name in "[A-Za-z ]{1,16}",
        items in prop::collection::vec(item(), 0..4),
    ) {
        let collection = Collection::new(&name, items, None);

        let decoded = Collection::from_json(&collection.to_json().unwrap()).unwrap();
        for (decoded, original) in decoded.item.iter().zip(&collection.item) {
            prop_assert_eq!(&decoded.request.url, &Url::from_raw(&original.request.url.raw));
        }
        prop_assert_eq!(decoded, collection);
    }

    #[test]
    fn text_without_actions_renders_unchanged(text in "[^{}]*") {
        let rendered = substitute(&text, &HashMap::new()).unwrap();
        prop_assert_eq!(rendered, text);
    }

    #[test]
    fn defined_keys_render_their_values(
        key in "[A-Za-z_][A-Za-z0-9_]{0,10}",
        value in "[^{}]{0,20}",
        prefix in "[^{}]{0,10}",
    ) {
        let mut variables = HashMap::new();
        variables.insert(key.clone(), value.clone());

        let dotted = substitute(&format!("{prefix}{{{{ .{key} }}}}"), &variables).unwrap();
        let bare = substitute(&format!("{prefix}{{{{{key}}}}}"), &variables).unwrap();

        prop_assert_eq!(&dotted, &format!("{prefix}{value}"));
        prop_assert_eq!(dotted, bare);
    }
}
