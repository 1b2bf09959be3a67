//! Request strings built from positional templates.
//!
//! Templates use `{}` for the next argument and `{N}` for the argument at
//! index `N`; `{{` and `}}` produce literal braces. Surplus arguments are
//! ignored.

use std::fmt;

use crate::{
    error::{Result, SpiderError},
    types::{GeoWindow, PixelSize},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    template: String,
}

impl RequestTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn is_empty(&self) -> bool {
        self.template.trim().is_empty()
    }

    /// Substitute `args` into the template
    pub fn fill<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        let mut out = String::with_capacity(self.template.len() + 64);
        let mut next_auto = 0usize;
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let mut slot = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => slot.push(ch),
                            None => {
                                return Err(SpiderError::Template(format!(
                                    "unclosed '{{' in '{}'",
                                    self.template
                                )))
                            }
                        }
                    }
                    let index = if slot.is_empty() {
                        next_auto += 1;
                        next_auto - 1
                    } else {
                        slot.trim().parse::<usize>().map_err(|_| {
                            SpiderError::Template(format!("unsupported slot '{{{}}}'", slot))
                        })?
                    };
                    let value = args.get(index).ok_or_else(|| {
                        SpiderError::Template(format!(
                            "slot {} has no value, only {} provided",
                            index,
                            args.len()
                        ))
                    })?;
                    out.push_str(value.as_ref());
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => {
                    return Err(SpiderError::Template(format!(
                        "single '}}' in '{}'",
                        self.template
                    )))
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }

    /// Map request: layer, xMin, yMin, xMax, yMax, width, height
    pub fn map_request(&self, layer: &str, window: &GeoWindow, size: PixelSize) -> Result<String> {
        self.fill(&[
            layer.to_string(),
            window.x_min.to_string(),
            window.y_min.to_string(),
            window.x_max.to_string(),
            window.y_max.to_string(),
            size.width.to_string(),
            size.height.to_string(),
        ])
    }

    /// Timestamp request: latitude, longitude
    pub fn timestamp_request(&self, latitude: f64, longitude: f64) -> Result<String> {
        self.fill(&[latitude.to_string(), longitude.to_string()])
    }
}

impl fmt::Display for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl From<&str> for RequestTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for RequestTemplate {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMS: &str = "http://maps.example.com/wms?SERVICE=WMS&REQUEST=GetMap&LAYERS={}\
        &BBOX={},{},{},{}&WIDTH={}&HEIGHT={}&FORMAT=image/png";

    #[test]
    fn test_map_request() {
        let template = RequestTemplate::new(WMS);
        let request = template
            .map_request("WGS84", &GeoWindow::new(-2.5, -2.5, 12.5, 12.5), PixelSize::new(100, 80))
            .unwrap();
        assert_eq!(
            request,
            "http://maps.example.com/wms?SERVICE=WMS&REQUEST=GetMap&LAYERS=WGS84\
             &BBOX=-2.5,-2.5,12.5,12.5&WIDTH=100&HEIGHT=80&FORMAT=image/png"
        );
    }

    #[test]
    fn test_indexed_slots_and_escapes() {
        let template = RequestTemplate::new("{1}/{0}?q={{raw}}&n={}");
        assert_eq!(template.fill(&["a", "b"]).unwrap(), "b/a?q={raw}&n=a");
    }

    #[test]
    fn test_timestamp_request_orders_latitude_first() {
        let template = RequestTemplate::new("http://time.example.com/?lat={}&lon={}");
        let request = template.timestamp_request(31.25, 121.5).unwrap();
        assert_eq!(request, "http://time.example.com/?lat=31.25&lon=121.5");
    }

    #[test]
    fn test_missing_argument() {
        let err = RequestTemplate::new("{}{}{}").fill(&["x", "y"]).unwrap_err();
        assert!(matches!(err, SpiderError::Template(_)));
    }

    #[test]
    fn test_surplus_arguments_are_ignored() {
        assert_eq!(RequestTemplate::new("{}").fill(&["x", "y"]).unwrap(), "x");
    }

    #[test]
    fn test_malformed_templates() {
        assert!(RequestTemplate::new("abc{").fill(&["x"]).is_err());
        assert!(RequestTemplate::new("abc}").fill(&["x"]).is_err());
        assert!(RequestTemplate::new("{name}").fill(&["x"]).is_err());
    }
}
