//! Benchmark: lex a generated declaration file, then assemble and populate a
//! resource through a mixed fixed/variable-width template.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kdlc::{lex, BinaryType, Container, Rect, Resource, Token, TokenKind};

fn generated_source(resources: usize) -> String {
    let mut src = String::from("@type Ship : \"shïp\" {\n  template { HWRD Mass; PSTR Name; RECT Bounds; }\n}\n");
    for i in 0..resources {
        src.push_str(&format!(
            "` ship {i}\nnew (#{}, \"Ship {i}\") {{\n  Mass = 0x{:x};\n  Name = \"hull {i}\";\n  Bounds = $(({i} << 2) + 1);\n}}\n",
            128 + i,
            i * 3
        ));
    }
    src
}

fn ship() -> Container {
    let label = |s: &str| Token::synthetic(s, TokenKind::Identifier);
    let mut c = Container::new(label("Ship"), "shïp");
    for (name, ty) in [
        ("Mass", BinaryType::Hwrd),
        ("Name", BinaryType::Pstr),
        ("Bounds", BinaryType::Rect),
        ("Class", BinaryType::Cnnn(16)),
        ("Crew", BinaryType::Dlng),
        ("Notes", BinaryType::Cstr),
    ] {
        if c.add_template_field(label(name), ty).is_err() {
            panic!("duplicate slot {name}");
        }
    }
    c
}

fn bench_lex_assemble(c: &mut Criterion) {
    let src = generated_source(500);
    let token_count = lex(&src).map(|t| t.len()).unwrap_or(0);
    eprintln!("lex: {} bytes, {} tokens (one warm-up pass)", src.len(), token_count);

    c.bench_function("lex_500_resources", |b| {
        b.iter(|| black_box(lex(black_box(&src)).map(|t| t.len())))
    });

    let container = ship();
    let mut resource = Resource::of(&container, 128, "Shuttle");
    resource.write_short("Mass", 10).unwrap();
    resource.write_pstr("Name", "Shuttle").unwrap();
    resource.write_rect("Bounds", Rect::new(0, 0, 32, 64)).unwrap();
    resource.write_cstr("Class", "light").unwrap();
    resource.write_signed_long("Crew", 4).unwrap();
    resource.write_cstr("Notes", "a short-range transport").unwrap();
    let bytes = resource.assemble().unwrap();

    c.bench_function("assemble_ship", |b| {
        b.iter(|| black_box(black_box(&resource).assemble().map(|v| v.len())))
    });

    c.bench_function("populate_ship", |b| {
        b.iter(|| {
            let mut r = Resource::of(&container, 128, "Shuttle");
            black_box(r.import(black_box(&bytes)).is_ok())
        })
    });
}

criterion_group!(benches, bench_lex_assemble);
criterion_main!(benches);
