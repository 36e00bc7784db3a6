/// Phrases that together identify one license text.
///
/// Phrases are written in normalized form: lowercase ASCII words separated
/// by single spaces, punctuation removed (see [`normalize_text`]).
pub struct Signature {
    pub spdx_id: &'static str,
    pub phrases: &'static [&'static str],
}

pub const SIGNATURES: &[Signature] = &[
    Signature {
        spdx_id: "MIT",
        phrases: &[
            "permission is hereby granted free of charge to any person obtaining a copy",
            "the above copyright notice and this permission notice shall be included in all copies or substantial portions of the software",
            "the software is provided as is without warranty of any kind",
        ],
    },
    Signature {
        spdx_id: "Apache-2.0",
        phrases: &[
            "apache license",
            "version 2 0",
            "terms and conditions for use reproduction and distribution",
            "grant of patent license",
        ],
    },
    Signature {
        spdx_id: "BSD-3-Clause",
        phrases: &[
            "redistribution and use in source and binary forms with or without modification are permitted",
            "redistributions of source code must retain the above copyright notice",
            "redistributions in binary form must reproduce the above copyright notice",
            "neither the name of",
        ],
    },
    Signature {
        spdx_id: "BSD-2-Clause",
        phrases: &[
            "redistribution and use in source and binary forms with or without modification are permitted",
            "redistributions of source code must retain the above copyright notice",
            "redistributions in binary form must reproduce the above copyright notice",
        ],
    },
    Signature {
        spdx_id: "ISC",
        phrases: &[
            "permission to use copy modify and or distribute this software for any purpose with or without fee is hereby granted",
            "the software is provided as is and the author disclaims all warranties",
        ],
    },
    Signature {
        spdx_id: "MPL-2.0",
        phrases: &[
            "mozilla public license version 2 0",
            "covered software",
            "larger work",
        ],
    },
    Signature {
        spdx_id: "GPL-2.0",
        phrases: &["gnu general public license", "version 2 june 1991"],
    },
    Signature {
        spdx_id: "GPL-3.0",
        phrases: &["gnu general public license", "version 3 29 june 2007"],
    },
    Signature {
        spdx_id: "LGPL-2.1",
        phrases: &[
            "gnu lesser general public license",
            "version 2 1 february 1999",
            "the library",
        ],
    },
    Signature {
        spdx_id: "LGPL-3.0",
        phrases: &[
            "gnu lesser general public license",
            "version 3 29 june 2007",
            "additional permissions",
        ],
    },
    Signature {
        spdx_id: "AGPL-3.0",
        phrases: &[
            "gnu affero general public license",
            "version 3 19 november 2007",
            "remote network interaction",
        ],
    },
    Signature {
        spdx_id: "Unlicense",
        phrases: &["this is free and unencumbered software released into the public domain"],
    },
    Signature {
        spdx_id: "CC0-1.0",
        phrases: &["creative commons legal code", "cc0 1 0 universal"],
    },
    Signature {
        spdx_id: "Zlib",
        phrases: &[
            "this software is provided as is without any express or implied warranty",
            "the origin of this software must not be misrepresented",
        ],
    },
];

/// Lowercase, turn every non-alphanumeric run into one space.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("  Apache License,\n   Version 2.0 (the \"License\")"),
            "apache license version 2 0 the license"
        );
    }

    #[test]
    fn test_phrases_are_normalized() {
        for sig in SIGNATURES {
            for phrase in sig.phrases {
                assert_eq!(&normalize_text(phrase), phrase, "{}", sig.spdx_id);
            }
        }
    }
}
