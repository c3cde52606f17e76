//! Directive round trips through extraction and chunk rendering.

use plugin_oxc_directive::DirectivePreserver;

#[test]
fn sibling_modules_share_one_chunk() {
    let preserver = DirectivePreserver::new();
    let foo = preserver
        .extract(
            "/src/foo.ts",
            "\"use client\";\n\"use sukka\";\n\nexport const foo = 'foo';\n",
        )
        .unwrap();
    let bar = preserver
        .extract("/src/bar.ts", "\"use client\";\nexport const bar = 'bar';\n")
        .unwrap();
    assert_eq!(foo, "\n\n\nexport const foo = 'foo';\n");
    assert_eq!(bar, "\nexport const bar = 'bar';\n");

    let body = "const foo = 'foo';\nconst bar = 'bar';\nexport { bar, foo };\n";
    let rendered = preserver
        .render(body, ["/src/foo.ts", "/src/bar.ts"], false)
        .unwrap();

    assert!(rendered.code.starts_with("'use client';\n'use sukka';\n"));
    assert!(rendered.code.ends_with(body));
    assert_eq!(rendered.code.matches("'use client';").count(), 1);
}

#[test]
fn first_seen_order_follows_module_order() {
    let preserver = DirectivePreserver::new();
    preserver.extract("/a.ts", "'use a'\nexport {}");
    preserver.extract("/b.ts", "'use b'\n'use a'\nexport {}");

    let rendered = preserver.render("x", ["/b.ts", "/a.ts"], false).unwrap();
    assert_eq!(rendered.code, "'use b';\n'use a';\nx");
}

#[test]
fn separate_chunks_keep_their_own_directives() {
    let preserver = DirectivePreserver::new();
    preserver.extract("/src/client.ts", "\"use client\";\nexport const client = 1;\n");
    preserver.extract("/src/server.ts", "\"use server\";\nexport const server = 1;\n");

    let client = preserver
        .render("export const client = 1;\n", ["/src/client.ts"], false)
        .unwrap();
    let server = preserver
        .render("export const server = 1;\n", ["/src/server.ts"], false)
        .unwrap();

    assert!(client.code.starts_with("'use client';"));
    assert!(!client.code.contains("'use server'"));
    assert!(server.code.starts_with("'use server';"));
    assert!(!server.code.contains("'use client'"));
}

#[test]
fn chunk_without_directives_is_untouched() {
    let preserver = DirectivePreserver::new();
    preserver.extract("/src/plain.ts", "export const a = 1;\n");
    preserver.extract("/src/other.ts", "'use client'\nexport const b = 1;\n");

    assert!(preserver
        .render("export const a = 1;\n", ["/src/plain.ts"], true)
        .is_none());
    assert!(preserver
        .render("export {};\n", std::iter::empty::<&str>(), false)
        .is_none());
}

#[test]
fn shebang_is_emitted_verbatim() {
    let preserver = DirectivePreserver::new();
    preserver.extract("/bin/cli.ts", "#!/usr/bin/env node\nconsole.log('hi');\n");

    let rendered = preserver
        .render("console.log('hi');\n", ["/bin/cli.ts"], false)
        .unwrap();
    assert_eq!(rendered.code, "#!/usr/bin/env node\nconsole.log('hi');\n");
}
