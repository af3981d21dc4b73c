/// 3x5 bitmap glyphs for printable ASCII (0x20..=0x7e), five 3-bit rows packed
/// top row first into the low 15 bits.
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400,
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4,
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292,
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2,
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f,
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f,
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd,
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007,
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79,
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f,
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a,
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;
const FALLBACK_CHAR: char = '?';

pub(crate) const fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub(crate) const fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale
}

fn glyph_bits(ch: char) -> u16 {
    let code = ch as u32;
    if (0x20..=0x7e).contains(&code) {
        GLYPHS[(code - 0x20) as usize]
    } else {
        GLYPHS[(FALLBACK_CHAR as u32 - 0x20) as usize]
    }
}

fn glyph_pixel_set(bits: u16, row: i32, col: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

/// RGBA8 frame view with clipped drawing primitives.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color[0], color[1], color[2], 255]);
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel = (y as usize).checked_mul(self.width as usize)?.checked_add(x as usize)?;
        let byte = pixel.checked_mul(4)?;
        (byte + 4 <= self.frame.len()).then_some(byte)
    }

    pub(crate) fn put(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if let Some(offset) = self.offset(x, y) {
            self.frame[offset..offset + 4].copy_from_slice(&[color[0], color[1], color[2], 255]);
        }
    }

    /// Alpha-over blend; `alpha` in 0..=1.
    pub(crate) fn blend(&mut self, x: i32, y: i32, color: [u8; 3], alpha: f32) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let alpha = alpha.clamp(0.0, 1.0);
        for channel in 0..3 {
            let current = self.frame[offset + channel] as f32;
            let mixed = current + (color[channel] as f32 - current) * alpha;
            self.frame[offset + channel] = mixed.round() as u8;
        }
    }

    /// Saturating additive blend, used for glowing particles.
    pub(crate) fn add(&mut self, x: i32, y: i32, color: [u8; 3], intensity: f32) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let intensity = intensity.clamp(0.0, 1.0);
        for channel in 0..3 {
            let added = self.frame[offset + channel] as f32 + color[channel] as f32 * intensity;
            self.frame[offset + channel] = added.min(255.0) as u8;
        }
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 3], alpha: f32) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(w).min(self.width as i32);
        let end_y = y.saturating_add(h).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend(px, py, color, alpha);
            }
        }
    }

    pub(crate) fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 3]) {
        if w <= 1 || h <= 1 {
            return;
        }
        self.fill_rect(x, y, w, 1, color, 1.0);
        self.fill_rect(x, y + h - 1, w, 1, color, 1.0);
        self.fill_rect(x, y, 1, h, color, 1.0);
        self.fill_rect(x + w - 1, y, 1, h, color, 1.0);
    }

    pub(crate) fn additive_disc(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 3], intensity: f32) {
        if radius < 0.75 {
            self.add(cx.round() as i32, cy.round() as i32, color, intensity);
            return;
        }
        let r = radius.ceil() as i32;
        let (icx, icy) = (cx.round() as i32, cy.round() as i32);
        let radius_sq = radius * radius;
        for dy in -r..=r {
            for dx in -r..=r {
                let dist_sq = (dx * dx + dy * dy) as f32;
                if dist_sq > radius_sq {
                    continue;
                }
                // Soft falloff toward the rim.
                let falloff = 1.0 - dist_sq / radius_sq * 0.6;
                self.add(icx + dx, icy + dy, color, intensity * falloff);
            }
        }
    }

    pub(crate) fn ring(&mut self, cx: f32, cy: f32, radius: f32, thickness: f32, color: [u8; 3]) {
        let outer = radius + thickness * 0.5;
        let inner = (radius - thickness * 0.5).max(0.0);
        let r = outer.ceil() as i32;
        let (icx, icy) = (cx.round() as i32, cy.round() as i32);
        for dy in -r..=r {
            for dx in -r..=r {
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist >= inner && dist <= outer {
                    self.put(icx + dx, icy + dy, color);
                }
            }
        }
    }

    pub(crate) fn text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: [u8; 3]) {
        let scale = scale.max(1);
        let mut pen_x = x;
        for ch in text.chars() {
            self.glyph(pen_x, y, glyph_bits(ch), scale, color);
            pen_x += glyph_advance(scale);
        }
    }

    fn glyph(&mut self, x: i32, y: i32, bits: u16, scale: i32, color: [u8; 3]) {
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyph_pixel_set(bits, row, col) {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.put(x + col * scale + sx, y + row * scale + sy, color);
                    }
                }
            }
        }
    }
}

pub(crate) fn text_width_px(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance(scale.max(1))
}

/// Greedy word wrap; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
