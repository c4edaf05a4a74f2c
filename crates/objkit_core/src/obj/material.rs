//! MTL material library parser.
//!
//! `newmtl` opens a fresh material under its name, replacing any earlier
//! material with that name. Every other directive sets one field of the
//! material opened last.

use super::keyword::MtlKeyword;
use super::parser::{parse_float, parse_floats, ParseError, ParseResult};
use super::tokenizer::{tokenize, Line};
use super::types::{Material, MaterialLibrary};

/// Parse an MTL document.
pub fn parse_mtl(text: &str) -> ParseResult<MaterialLibrary> {
    let mut parser = MtlParser::default();
    for line in tokenize(text) {
        parser.dispatch(&line)?;
    }

    log::debug!("Parsed {} materials", parser.library.len());
    Ok(parser.library)
}

#[derive(Default)]
struct MtlParser {
    library: MaterialLibrary,
    /// Name of the material opened by the last `newmtl`
    current: Option<String>,
}

impl MtlParser {
    fn dispatch(&mut self, line: &Line<'_>) -> ParseResult<()> {
        let Some(keyword) = MtlKeyword::parse(line.keyword) else {
            log::warn!("Unhandled MTL keyword `{}` at line {}", line.keyword, line.number);
            return Ok(());
        };

        if keyword == MtlKeyword::NewMaterial {
            let name = line.remainder.to_string();
            if self.library.insert(name.clone(), Material::default()).is_some() {
                log::debug!("Material {} redefined at line {}", name, line.number);
            }
            self.current = Some(name);
            return Ok(());
        }

        let material = self.current_material(keyword, line.number)?;

        match keyword {
            MtlKeyword::Shininess => material.shininess = Some(first_float(line, keyword)?),
            MtlKeyword::Ambient => material.ambient = Some(parse_floats(&line.parts, line.number)?),
            MtlKeyword::Diffuse => material.diffuse = Some(parse_floats(&line.parts, line.number)?),
            MtlKeyword::Specular => material.specular = Some(parse_floats(&line.parts, line.number)?),
            MtlKeyword::Emissive => material.emissive = Some(parse_floats(&line.parts, line.number)?),
            MtlKeyword::OpticalDensity => material.optical_density = Some(first_float(line, keyword)?),
            MtlKeyword::Opacity => material.opacity = Some(first_float(line, keyword)?),
            MtlKeyword::Illumination => {
                let token = first_part(line, keyword)?;
                material.illum = Some(parse_illum(token, line.number)?);
            }
            MtlKeyword::DiffuseMap => {
                if line.remainder.is_empty() {
                    return Err(ParseError::MissingValue {
                        line: line.number,
                        keyword: keyword.as_str(),
                    });
                }
                material.map_diffuse = Some(line.remainder.to_string());
            }
            MtlKeyword::NewMaterial => {}
        }

        Ok(())
    }

    fn current_material(&mut self, keyword: MtlKeyword, line: usize) -> ParseResult<&mut Material> {
        self.current
            .as_deref()
            .and_then(|name| self.library.materials.get_mut(name))
            .ok_or(ParseError::NoActiveMaterial {
                line,
                keyword: keyword.as_str(),
            })
    }
}

fn first_part<'a>(line: &Line<'a>, keyword: MtlKeyword) -> ParseResult<&'a str> {
    line.parts.first().copied().ok_or(ParseError::MissingValue {
        line: line.number,
        keyword: keyword.as_str(),
    })
}

/// Illumination model number. Integral floats such as `2.0` are accepted.
fn parse_illum(token: &str, line: usize) -> ParseResult<i32> {
    if let Ok(illum) = token.parse::<i32>() {
        return Ok(illum);
    }

    match token.parse::<f32>() {
        Ok(value) if value.fract() == 0.0 && value.abs() <= i32::MAX as f32 => Ok(value as i32),
        _ => Err(ParseError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn first_float(line: &Line<'_>, keyword: MtlKeyword) -> ParseResult<f32> {
    parse_float(first_part(line, keyword)?, line.number)
}
