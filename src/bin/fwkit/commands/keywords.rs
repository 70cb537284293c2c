//! `fwkit keywords` command

use anyhow::Result;

use crate::cli::KeywordsArgs;
use fwkit::ops::extract_keywords;
use fwkit::util::GlobalContext;

pub fn execute(args: KeywordsArgs, ctx: &GlobalContext) -> Result<()> {
    for keyword in extract_keywords(ctx, &args.headers)? {
        println!("{}", keyword);
    }
    Ok(())
}
