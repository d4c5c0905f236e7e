// Shared fixtures for the integration tests.
#![allow(dead_code)]

use bmv2_parser::ir::{Expr, Type, build::*};

pub fn ethernet_t() -> Type {
    header_type(
        "ethernet_t",
        &[("dstAddr", bits(48)), ("srcAddr", bits(48)), ("etherType", bits(16))],
    )
}

pub fn vlan_t() -> Type {
    header_type("vlan_t", &[("pcp", bits(3)), ("tci", bits(13)), ("etherType", bits(16))])
}

pub fn headers_t() -> Type {
    struct_type(
        "headers_t",
        &[
            ("ethernet", ethernet_t()),
            ("h", header_type("h_t", &[("f", bits(8)), ("g", bits(4))])),
            (
                "vlan",
                Type::HeaderStack {
                    elem: Box::new(vlan_t()),
                    size: 2,
                },
            ),
        ],
    )
}

pub fn meta_t() -> Type {
    struct_type(
        "meta_t",
        &[
            ("seen", Type::Bool),
            ("count", bits(8)),
            ("pair", struct_type("pair_t", &[("a", bits(4)), ("b", bits(4))])),
        ],
    )
}

pub fn hdr() -> Expr {
    path("hdr", headers_t())
}

pub fn meta() -> Expr {
    path("meta", meta_t())
}

/// `hdr.<header>.<field>`
pub fn hfield(header: &str, field: &str) -> Expr {
    member(member(hdr(), header), field)
}
