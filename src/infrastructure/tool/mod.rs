//! Third-party tool implementations

mod wolframalpha;

pub use wolframalpha::{
    WolframAlphaProvider, WolframAlphaTool, WOLFRAMALPHA_API_URL, WOLFRAMALPHA_TIMEOUT,
};
