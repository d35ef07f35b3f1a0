use crate::models::Post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    /// Posts above the previous watermark, oldest first.
    pub new_posts: Vec<Post>,
    pub watermark: u64,
}

/// Splits `posts` against the stored watermark. Input order does not matter.
pub fn detect_new_posts(posts: &[Post], last_vid: u64) -> Delta {
    let watermark = posts
        .iter()
        .map(|post| post.vid)
        .fold(last_vid, u64::max);

    let mut new_posts: Vec<Post> = posts
        .iter()
        .filter(|post| post.vid > last_vid)
        .cloned()
        .collect();
    new_posts.sort_by_key(|post| post.vid);

    Delta {
        new_posts,
        watermark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post(vid: u64) -> Post {
        Post::new(vid, format!("post {}", vid), format!("https://otr.co.kr/audition/view?vid={}", vid))
    }

    fn vids(posts: &[Post]) -> Vec<u64> {
        posts.iter().map(|p| p.vid).collect()
    }

    #[test]
    fn only_posts_above_watermark_ascending() {
        let posts = vec![post(20), post(8), post(15), post(10)];

        let delta = detect_new_posts(&posts, 10);

        assert_eq!(vids(&delta.new_posts), vec![15, 20]);
        assert_eq!(delta.watermark, 20);
    }

    #[test]
    fn empty_input_keeps_watermark() {
        let delta = detect_new_posts(&[], 37);
        assert!(delta.new_posts.is_empty());
        assert_eq!(delta.watermark, 37);
    }

    #[test]
    fn stale_posts_never_lower_watermark() {
        let delta = detect_new_posts(&[post(3), post(1)], 50);
        assert!(delta.new_posts.is_empty());
        assert_eq!(delta.watermark, 50);
    }

    #[test]
    fn first_run_treats_everything_as_new() {
        let delta = detect_new_posts(&[post(2), post(9), post(4)], 0);
        assert_eq!(vids(&delta.new_posts), vec![2, 4, 9]);
        assert_eq!(delta.watermark, 9);
    }

    #[test]
    fn watermark_and_filter_hold_across_inputs() {
        let lists: Vec<Vec<Post>> = vec![
            vec![],
            vec![post(1)],
            vec![post(5), post(5), post(6)],
            vec![post(100), post(42), post(7), post(43)],
        ];

        for posts in &lists {
            for last_vid in [0, 5, 42, 43, 200] {
                let delta = detect_new_posts(posts, last_vid);
                let expected = posts.iter().map(|p| p.vid).max().unwrap_or(last_vid).max(last_vid);

                assert_eq!(delta.watermark, expected);
                assert!(delta.new_posts.iter().all(|p| p.vid > last_vid));
                assert!(delta.new_posts.windows(2).all(|w| w[0].vid <= w[1].vid));
                assert_eq!(
                    delta.new_posts.len(),
                    posts.iter().filter(|p| p.vid > last_vid).count()
                );
                assert_eq!(detect_new_posts(posts, last_vid), delta);
            }
        }
    }
}
